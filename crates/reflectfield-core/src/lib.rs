//! Core types, configuration, and compile-session state for Reflectfield.
//!
//! This crate provides the vocabulary shared by the document layer and the
//! field engine: field and entry identifiers, the compiled record stored per
//! entry, export modes, configuration, and the compile session that guards a
//! field against embedding its own output while it is being compiled.

mod config;
mod error;
mod state;
mod types;

pub use config::ReflectFieldConfig;
pub use error::{ReflectFieldError, ReflectFieldResult};
pub use state::{CompileGuard, CompileSession};
pub use types::{CompiledRecord, EntryId, ExportMode, FieldId};
