//! Document tree and path-query evaluation for Reflectfield.
//!
//! This crate provides the tree a reflection field's expression is evaluated
//! against, and the XML writer for a field's own output element.
//!
//! # Key components
//!
//! - [`Document`]: an arena-backed XML tree parsed with `quick-xml`
//! - [`TreeEvaluator`]: the contract the field engine evaluates path queries through
//! - [`xpath`]: lexer, parser and evaluator for an XPath 1.0 subset
//! - [`OutputElement`] and [`write_elements`] for serializing field output

pub mod document;
pub mod error;
pub mod serialize;
pub mod xpath;

pub use document::{Document, NodeId, NodeKind};
pub use error::XmlError;
pub use serialize::{OutputElement, write_elements};
pub use xpath::{TreeEvaluator, XPathError, XValue, parse_xpath};
