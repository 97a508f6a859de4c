//! Documents that expressions are compiled against.
//!
//! The host builds the document for an entry (usually the entry's own XML
//! plus page parameters, optionally passed through an XSLT utility). The
//! engine only asks for it through [`DocumentSource`].

use dashmap::DashMap;
use reflectfield_core::{CompileSession, EntryId};
use reflectfield_xml::{Document, TreeEvaluator};

/// What the engine asks a [`DocumentSource`] for.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRequest<'a> {
    /// The session the compiling field is marked in. Sources that embed
    /// field output must pass it to `append_formatted_element`.
    pub session: &'a CompileSession,
    /// The entry being compiled.
    pub entry_id: EntryId,
    /// Element name of the compiling field.
    pub element_name: &'a str,
    /// XSLT utility to transform the document with, if configured.
    pub xslt: Option<&'a str>,
    /// Whether associated entry counts should be included.
    pub fetch_associated_counts: bool,
}

/// Builds the document an entry's expression is evaluated against.
pub trait DocumentSource: Send + Sync {
    /// Build the document for `request`.
    ///
    /// # Errors
    ///
    /// Any failure aborts the compile call.
    fn load(&self, request: &DocumentRequest<'_>) -> anyhow::Result<Box<dyn TreeEvaluator>>;
}

impl<F> DocumentSource for F
where
    F: Fn(&DocumentRequest<'_>) -> anyhow::Result<Box<dyn TreeEvaluator>> + Send + Sync,
{
    fn load(&self, request: &DocumentRequest<'_>) -> anyhow::Result<Box<dyn TreeEvaluator>> {
        self(request)
    }
}

/// XML text per entry, parsed on every load.
///
/// Entries without XML compile against an empty document.
#[derive(Debug, Default)]
pub struct MemoryDocumentSource {
    documents: DashMap<EntryId, String>,
}

impl MemoryDocumentSource {
    /// An empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the XML for `entry_id`.
    pub fn insert(&self, entry_id: EntryId, xml: impl Into<String>) {
        self.documents.insert(entry_id, xml.into());
    }
}

impl DocumentSource for MemoryDocumentSource {
    fn load(&self, request: &DocumentRequest<'_>) -> anyhow::Result<Box<dyn TreeEvaluator>> {
        if let Some(xslt) = request.xslt {
            tracing::debug!(entry = %request.entry_id, xslt, "xslt utilities are not applied by the memory source");
        }
        let Some(xml) = self.documents.get(&request.entry_id) else {
            tracing::debug!(entry = %request.entry_id, "no document for entry, using empty document");
            return Ok(Box::new(Document::empty()));
        };
        let document = Document::parse(xml.value())?;
        Ok(Box::new(document))
    }
}
