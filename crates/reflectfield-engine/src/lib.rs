//! Field engine for Reflectfield.
//!
//! A reflection field stores a value computed from a template whose `{...}`
//! placeholders are path queries against the entry's document. This crate
//! compiles those templates, formats and slugs the result, and turns filter
//! and sort requests on the stored values into query fragments.
//!
//! # Key components
//!
//! - [`ReflectionField`]: the configured field and its operations
//! - [`expression`]: placeholder extraction, path normalization and substitution
//! - [`format`]: formatter registry, sanitizer and slug generator
//! - [`filter`]: filter classification, predicate fragments and SQL rendering
//! - [`group`]: grouping of entries by handle
//! - [`DocumentSource`] and [`StorageWriter`]: collaborators supplied by the host

pub mod error;
pub mod expression;
pub mod field;
pub mod filter;
pub mod format;
pub mod group;
pub mod sort;
pub mod source;
pub mod storage;

pub use error::{FieldError, FieldResult};
pub use expression::ExpressionCompiler;
pub use field::{Capability, FieldSettings, ReflectionField};
pub use filter::{FilterOutcome, JoinCounter, PredicateFragment, QueryParts, SqlRenderer};
pub use format::{FormatterRegistry, FormatterSelection, TextFormatter, ValueFormatter};
pub use group::{EntryRecord, FieldRecord, RecordGroups, group_records};
pub use sort::{SortClause, SortDirection};
pub use source::{DocumentRequest, DocumentSource, MemoryDocumentSource};
pub use storage::{MemoryFieldStore, StorageWriter};
