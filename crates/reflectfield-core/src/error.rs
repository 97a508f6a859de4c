//! Error types for the Reflectfield core.

/// Core error type for Reflectfield infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum ReflectFieldError {
    /// Invalid field or entry identifier.
    #[error("invalid identifier: {0} (must be a positive integer)")]
    InvalidId(String),

    /// Unknown export mode name.
    #[error("unknown export mode: {0}")]
    UnknownExportMode(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for Reflectfield operations.
pub type ReflectFieldResult<T> = Result<T, ReflectFieldError>;
