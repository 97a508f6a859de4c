//! Identifiers and records shared across the field engine.

use std::fmt;
use std::str::FromStr;

use crate::error::ReflectFieldError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a new identifier.
            ///
            /// # Errors
            /// Returns an error if `id` is zero.
            pub fn new(id: u32) -> Result<Self, ReflectFieldError> {
                if id == 0 {
                    return Err(ReflectFieldError::InvalidId(id.to_string()));
                }
                Ok(Self(id))
            }

            /// Get the raw numeric value.
            #[must_use]
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = ReflectFieldError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id = s
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ReflectFieldError::InvalidId(s.to_owned()))?;
                Self::new(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a field (one reflection field definition in a section).
    FieldId
);

numeric_id!(
    /// Identifier of an entry (one row of content the field belongs to).
    EntryId
);

/// The three values a reflection field stores per entry.
///
/// `handle` is a slug of `value`; `value_formatted` is either the formatter
/// output or a sanitized copy of `value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompiledRecord {
    /// URL-safe slug of `value`, absent when `value` slugs to nothing.
    pub handle: Option<String>,
    /// The template with every placeholder substituted.
    pub value: String,
    /// Formatter output, or the sanitized `value` when no formatter applied.
    pub value_formatted: String,
}

/// How a stored record is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ExportMode {
    /// Export the raw substituted value.
    Value,
    /// Export the formatted value.
    Formatted,
}

impl ExportMode {
    /// All export modes, in the order they are offered to hosts.
    pub const ALL: [Self; 2] = [Self::Value, Self::Formatted];

    /// The name a host uses to request this mode.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Value => "getValue",
            Self::Formatted => "getFormatted",
        }
    }
}

impl FromStr for ExportMode {
    type Err = ReflectFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| ReflectFieldError::UnknownExportMode(s.to_owned()))
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_valid_ids() {
        let field = FieldId::new(12).unwrap();
        assert_eq!(field.get(), 12);
        assert_eq!(field.to_string(), "12");

        let entry: EntryId = " 7 ".parse().unwrap();
        assert_eq!(entry.get(), 7);
    }

    #[test]
    fn test_should_reject_invalid_ids() {
        assert!(FieldId::new(0).is_err());
        assert!("abc".parse::<EntryId>().is_err());
        assert!("-3".parse::<FieldId>().is_err());
    }

    #[test]
    fn test_should_parse_export_modes_by_name() {
        assert_eq!("getValue".parse::<ExportMode>().unwrap(), ExportMode::Value);
        assert_eq!(
            "getFormatted".parse::<ExportMode>().unwrap(),
            ExportMode::Formatted
        );
        assert!("getFORMATTED".parse::<ExportMode>().is_err());
    }

    #[test]
    fn test_should_serialize_compiled_record() {
        let record = CompiledRecord {
            handle: Some("hello-world".to_owned()),
            value: "Hello World".to_owned(),
            value_formatted: "Hello World".to_owned(),
        };
        let json = serde_json::to_string(&record).expect("test serialization");
        assert!(json.contains("\"handle\":\"hello-world\""));
        assert!(json.contains("\"value_formatted\""));
    }
}
