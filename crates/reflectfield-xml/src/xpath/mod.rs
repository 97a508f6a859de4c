//! XPath 1.0 subset used by reflection expressions.
//!
//! Queries are lexed and parsed into an [`ast::Expr`], then evaluated against
//! a [`Document`] with the document root as context node. Supported are
//! absolute and relative location paths over the child, descendant, self,
//! parent, ancestor, attribute and sibling axes, predicates, unions,
//! comparisons, arithmetic and the core string/number/boolean functions.
//! Variables, namespaces and the `id()`/`lang()` functions are not.

pub mod ast;
pub mod evaluator;
pub mod parser;

pub use evaluator::XValue;
pub use parser::{XPathError, parse_xpath};

use crate::document::Document;

/// Evaluates path queries to strings.
///
/// The field engine evaluates placeholders through this trait so that any
/// tree with XPath semantics can back it.
pub trait TreeEvaluator: Send + Sync {
    /// Evaluate `query` and convert the result with `string()` semantics.
    ///
    /// # Errors
    ///
    /// Returns `XPathError` if the query does not parse or evaluate.
    fn evaluate_string(&self, query: &str) -> Result<String, XPathError>;
}

impl TreeEvaluator for Document {
    fn evaluate_string(&self, query: &str) -> Result<String, XPathError> {
        Ok(self.evaluate_query(query)?.into_string(self))
    }
}
