//! Value formatting: named transformer, entity repair and sanitize fallback.

use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use super::registry::{FormatterRegistry, FormatterSelection};
use crate::error::{FieldError, FieldResult};

/// An `&` with the entity or character reference that may follow it.
static AMPERSAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&([a-z]{0,4}\w{2,3};|#[x0-9a-f]{2,6};)?").expect("valid regex")
});

/// Applies a field's formatter selection to a compiled value.
#[derive(Debug, Clone, Default)]
pub struct ValueFormatter {
    registry: Arc<FormatterRegistry>,
}

impl ValueFormatter {
    /// Create a formatter backed by `registry`.
    #[must_use]
    pub fn new(registry: Arc<FormatterRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this formatter looks transformers up in.
    #[must_use]
    pub fn registry(&self) -> &Arc<FormatterRegistry> {
        &self.registry
    }

    /// Run the selected transformer over `raw`.
    ///
    /// Returns `None` when no formatter is selected. Bare ampersands in the
    /// transformer output are escaped.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::UnknownFormatter` if the selected name is not
    /// registered and `FieldError::Formatter` if the transformer fails.
    pub fn format(&self, raw: &str, selection: &FormatterSelection) -> FieldResult<Option<String>> {
        let FormatterSelection::Named(name) = selection else {
            return Ok(None);
        };
        let formatter = self
            .registry
            .get(name)
            .ok_or_else(|| FieldError::UnknownFormatter { name: name.clone() })?;
        let output = formatter.run(raw).map_err(|source| FieldError::Formatter {
            name: name.clone(),
            source,
        })?;
        tracing::debug!(formatter = %name, input_len = raw.len(), output_len = output.len(), "formatted value");
        Ok(Some(escape_ampersands(&output)))
    }

    /// Format `raw`, falling back to [`sanitize`] when no formatter is
    /// selected or the formatter produced an empty string.
    ///
    /// # Errors
    ///
    /// Same as [`ValueFormatter::format`].
    pub fn format_or_sanitize(&self, raw: &str, selection: &FormatterSelection) -> FieldResult<String> {
        Ok(match self.format(raw, selection)? {
            Some(formatted) if !formatted.is_empty() => formatted,
            _ => sanitize(raw),
        })
    }
}

/// Escape every `&` that does not start an entity or character reference.
#[must_use]
pub fn escape_ampersands(text: &str) -> String {
    AMPERSAND
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                caps[0].to_owned()
            } else {
                "&amp;".to_owned()
            }
        })
        .into_owned()
}

/// Escape markup-significant characters (`<`, `>`, `&`, `'`, `"`).
#[must_use]
pub fn sanitize(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}
