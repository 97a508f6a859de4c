//! Path resolution against a document.

use std::fmt;

use reflectfield_xml::TreeEvaluator;

/// Evaluates single path queries to trimmed strings.
///
/// Evaluation failures are logged and resolve to an empty string; they never
/// reach the caller.
pub struct PathResolver<'a> {
    evaluator: &'a dyn TreeEvaluator,
}

impl fmt::Debug for PathResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathResolver").finish_non_exhaustive()
    }
}

impl<'a> PathResolver<'a> {
    /// Wrap an evaluator.
    #[must_use]
    pub fn new(evaluator: &'a dyn TreeEvaluator) -> Self {
        Self { evaluator }
    }

    /// Name of the document's root element; empty for an empty document.
    #[must_use]
    pub fn root_name(&self) -> String {
        self.evaluate("name(/*)")
    }

    /// Resolve `path` as `string(path)`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        self.evaluate(&format!("string({path})"))
    }

    fn evaluate(&self, query: &str) -> String {
        match self.evaluator.evaluate_string(query) {
            Ok(value) => value.trim().to_owned(),
            Err(e) => {
                tracing::warn!(query, error = %e, "path evaluation failed, resolving to empty");
                String::new()
            }
        }
    }
}
