//! Error type for field engine operations.

use reflectfield_core::{EntryId, ReflectFieldError};
use thiserror::Error;

/// Errors raised while compiling, formatting or storing a field value.
///
/// Path evaluation failures never appear here: they resolve to an empty
/// string inside the expression compiler.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The configured formatter is not registered.
    #[error("unknown formatter: {name}")]
    UnknownFormatter {
        /// The formatter name that was looked up.
        name: String,
    },

    /// A registered formatter failed to transform its input.
    #[error("formatter '{name}' failed")]
    Formatter {
        /// The formatter name.
        name: String,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// The document an entry is compiled against could not be built.
    #[error("failed to load document for entry {entry}")]
    DocumentLoad {
        /// The entry being compiled.
        entry: EntryId,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// The storage writer rejected the compiled record.
    #[error("failed to store record for entry {entry}")]
    Storage {
        /// The entry being stored.
        entry: EntryId,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// A core error (identifiers, configuration).
    #[error(transparent)]
    Core(#[from] ReflectFieldError),
}

/// Convenience result type for field engine operations.
pub type FieldResult<T> = Result<T, FieldError>;
