//! Integration tests for the Reflectfield field engine.
//!
//! These tests drive fields end to end: document loading, compilation,
//! storage, output emission, filtering, sorting and grouping.
//!
//! Run them with:
//! ```text
//! cargo test -p reflectfield-integration
//! ```

use std::sync::{Arc, Once};

use reflectfield_core::{EntryId, FieldId, ReflectFieldConfig};
use reflectfield_engine::{
    FieldSettings, FormatterRegistry, FormatterSelection, MemoryDocumentSource, ReflectionField, ValueFormatter,
};

static INIT: Once = Once::new();

/// Initialize tracing (once), honouring `RUST_LOG` and otherwise the
/// configured log level.
pub fn init_tracing() {
    INIT.call_once(|| {
        let config = ReflectFieldConfig::from_env();
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
            )
            .with_test_writer()
            .init();
    });
}

/// Entries of a small library: `(id, title, author, year, genre)`.
pub const BOOKS: [(u32, &str, &str, u32, &str); 4] = [
    (1, "Notes on the Analytical Engine", "Ada Lovelace", 1843, "computing"),
    (2, "Frankenstein", "Mary Shelley", 1818, "fiction"),
    (3, "Sketch of the Analytical Engine", "Ada Lovelace", 1842, "computing"),
    (4, "The Last Man", "Mary Shelley", 1826, "fiction"),
];

/// Entry id from a raw number.
#[must_use]
pub fn entry_id(id: u32) -> EntryId {
    EntryId::new(id).unwrap_or_else(|e| panic!("invalid entry id {id}: {e}"))
}

/// Field id from a raw number.
#[must_use]
pub fn field_id(id: u32) -> FieldId {
    FieldId::new(id).unwrap_or_else(|e| panic!("invalid field id {id}: {e}"))
}

/// The XML document an entry is compiled against.
#[must_use]
pub fn book_xml(id: u32, title: &str, author: &str, year: u32, genre: &str) -> String {
    format!(
        r#"<data>
    <params><site-name>Library &amp; Archive</site-name></params>
    <entry id="{id}">
        <title>{title}</title>
        <author handle="{handle}">{author}</author>
        <year>{year}</year>
        <genre>{genre}</genre>
    </entry>
</data>"#,
        handle = author.to_lowercase().replace(' ', "-"),
    )
}

/// A document source holding every book in [`BOOKS`].
#[must_use]
pub fn library_source() -> MemoryDocumentSource {
    let source = MemoryDocumentSource::new();
    for (id, title, author, year, genre) in BOOKS {
        source.insert(entry_id(id), book_xml(id, title, author, year, genre));
    }
    tracing::debug!(entries = BOOKS.len(), "loaded library fixture");
    source
}

/// Formatters available to test fields: `uppercase` and `emphasis`.
#[must_use]
pub fn formatter() -> ValueFormatter {
    let registry = FormatterRegistry::new();
    registry.register("uppercase", |text: &str| -> anyhow::Result<String> { Ok(text.to_uppercase()) });
    registry.register("emphasis", |text: &str| -> anyhow::Result<String> {
        Ok(format!("<em>{text}</em>"))
    });
    ValueFormatter::new(Arc::new(registry))
}

/// A field with the given id, element name, expression and formatter.
#[must_use]
pub fn field(id: u32, element: &str, expression: &str, formatter_name: &str) -> ReflectionField {
    init_tracing();
    let settings = FieldSettings::builder()
        .field_id(field_id(id))
        .element_name(element)
        .expression(expression)
        .formatter(FormatterSelection::from_name(formatter_name))
        .build();
    ReflectionField::new(settings, formatter(), &ReflectFieldConfig::default())
        .unwrap_or_else(|e| panic!("invalid field {id}: {e}"))
}

mod test_compile;
mod test_filter;
mod test_group;
