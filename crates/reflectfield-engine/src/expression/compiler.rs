//! Template compilation.

use std::collections::HashMap;

use regex::Captures;
use reflectfield_core::CompiledRecord;
use reflectfield_xml::TreeEvaluator;

use super::placeholder::{PLACEHOLDER, extract_placeholders, inner, normalize};
use super::resolver::PathResolver;
use crate::error::FieldResult;
use crate::format::{DEFAULT_HANDLE_MAX_LENGTH, FormatterSelection, ValueFormatter, create_handle};

/// Compiles expression templates into stored records.
#[derive(Debug, Clone)]
pub struct ExpressionCompiler {
    formatter: ValueFormatter,
    handle_max_length: usize,
}

impl Default for ExpressionCompiler {
    fn default() -> Self {
        Self::new(ValueFormatter::default(), DEFAULT_HANDLE_MAX_LENGTH)
    }
}

impl ExpressionCompiler {
    /// Create a compiler.
    #[must_use]
    pub fn new(formatter: ValueFormatter, handle_max_length: usize) -> Self {
        Self {
            formatter,
            handle_max_length,
        }
    }

    /// The formatter applied to compiled values.
    #[must_use]
    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    /// Substitute every placeholder of `template` with its resolved value.
    ///
    /// Each distinct placeholder is resolved once; unresolvable placeholders
    /// become empty strings. Resolved text is not scanned for placeholders
    /// again.
    #[must_use]
    pub fn substitute(&self, template: &str, evaluator: &dyn TreeEvaluator) -> String {
        let spans = extract_placeholders(template);
        if spans.is_empty() {
            return template.to_owned();
        }

        let resolver = PathResolver::new(evaluator);
        let root_name = resolver.root_name();
        let resolved: HashMap<&str, String> = spans
            .into_iter()
            .map(|span| {
                let path = normalize(inner(span), &root_name);
                let value = resolver.resolve(&path);
                tracing::debug!(placeholder = span, path = %path, value = %value, "resolved placeholder");
                (span, value)
            })
            .collect();

        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| {
                resolved.get(&caps[0]).cloned().unwrap_or_default()
            })
            .into_owned()
    }

    /// Compile `template` against `evaluator` into a record.
    ///
    /// # Errors
    ///
    /// Returns `FieldError` if the selected formatter is unknown or fails.
    /// Path evaluation failures never produce an error.
    pub fn compile(
        &self,
        template: &str,
        evaluator: &dyn TreeEvaluator,
        selection: &FormatterSelection,
    ) -> FieldResult<CompiledRecord> {
        let value = self.substitute(template, evaluator);
        let value_formatted = self.formatter.format_or_sanitize(&value, selection)?;
        let handle = create_handle(&value, self.handle_max_length);
        Ok(CompiledRecord {
            handle,
            value,
            value_formatted,
        })
    }
}
