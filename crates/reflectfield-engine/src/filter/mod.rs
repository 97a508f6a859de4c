//! Filter predicate compilation.
//!
//! Turns one filter's tokens into structured join and predicate fragments
//! against a field's data table:
//!
//! 1. **Classification**: [`classify`] picks one syntax from the first token.
//! 2. **Compilation**: [`FilterCompiler`] builds a [`PredicateFragment`],
//!    drawing join aliases from the caller's [`JoinCounter`].
//! 3. **Rendering**: [`SqlRenderer`] turns fragments into SQL text, escaping
//!    every literal in one place.

pub mod ast;
pub mod classify;
pub mod compiler;
pub mod sql;

pub use ast::{
    Column, ColumnRef, Comparison, Join, JoinAlias, JoinCounter, LikePattern, Literal, MatchKind, Predicate,
    PredicateFragment, QueryParts,
};
pub use classify::{FilterKind, classify};
pub use compiler::{FilterCompiler, FilterOutcome, boolean_query, numeric_comparison};
pub use sql::{SqlRenderer, escape_like, escape_literal};
