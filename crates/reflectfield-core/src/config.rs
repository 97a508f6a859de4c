//! Configuration for the Reflectfield engine.
//!
//! Values are loaded from environment variables prefixed with `REFLECTFIELD_`.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{ReflectFieldError, ReflectFieldResult};

/// Engine-wide configuration.
///
/// # Examples
///
/// ```
/// use reflectfield_core::ReflectFieldConfig;
///
/// let config = ReflectFieldConfig::default();
/// assert_eq!(config.handle_max_length, 255);
/// assert_eq!(config.table_prefix, "tbl_entries_data_");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ReflectFieldConfig {
    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Maximum number of characters the slug generator keeps.
    #[builder(default = 255)]
    pub handle_max_length: usize,

    /// Prefix of the per-field data tables in rendered SQL.
    #[builder(default = String::from("tbl_entries_data_"))]
    pub table_prefix: String,

    /// Alias of the entries table that field joins attach to.
    #[builder(default = String::from("e"))]
    pub entry_alias: String,
}

impl Default for ReflectFieldConfig {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            handle_max_length: 255,
            table_prefix: String::from("tbl_entries_data_"),
            entry_alias: String::from("e"),
        }
    }
}

impl ReflectFieldConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `REFLECTFIELD_LOG_LEVEL` | `info` |
    /// | `REFLECTFIELD_HANDLE_MAX_LENGTH` | `255` |
    /// | `REFLECTFIELD_TABLE_PREFIX` | `tbl_entries_data_` |
    /// | `REFLECTFIELD_ENTRY_ALIAS` | `e` |
    ///
    /// Unparseable numeric values keep their default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("REFLECTFIELD_LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("REFLECTFIELD_HANDLE_MAX_LENGTH") {
            match v.parse::<usize>() {
                Ok(n) => config.handle_max_length = n,
                Err(e) => {
                    tracing::warn!(value = %v, error = %e, "ignoring invalid REFLECTFIELD_HANDLE_MAX_LENGTH");
                }
            }
        }
        if let Ok(v) = std::env::var("REFLECTFIELD_TABLE_PREFIX") {
            config.table_prefix = v;
        }
        if let Ok(v) = std::env::var("REFLECTFIELD_ENTRY_ALIAS") {
            config.entry_alias = v;
        }

        config
    }

    /// Check that the configured SQL identifiers are safe to splice into queries.
    ///
    /// # Errors
    ///
    /// Returns [`ReflectFieldError::Config`] if an identifier is empty or
    /// contains characters other than ASCII alphanumerics and `_`.
    pub fn validate(&self) -> ReflectFieldResult<()> {
        for (name, value) in [
            ("table_prefix", &self.table_prefix),
            ("entry_alias", &self.entry_alias),
        ] {
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
                return Err(ReflectFieldError::Config(format!(
                    "{name} must be a non-empty SQL identifier, got '{value}'"
                )));
            }
        }
        Ok(())
    }
}
