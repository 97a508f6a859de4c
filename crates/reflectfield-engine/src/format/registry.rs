//! Named text transformers.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;

/// A host-provided text transformation (markdown, typography, ...).
pub trait TextFormatter: Send + Sync {
    /// Transform `text`.
    ///
    /// # Errors
    ///
    /// Any failure is fatal for the compile call that requested it.
    fn run(&self, text: &str) -> anyhow::Result<String>;
}

impl<F> TextFormatter for F
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    fn run(&self, text: &str) -> anyhow::Result<String> {
        self(text)
    }
}

/// Thread-safe lookup of formatters by name.
#[derive(Default)]
pub struct FormatterRegistry {
    formatters: RwLock<HashMap<String, Arc<dyn TextFormatter>>>,
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("formatters", &self.names())
            .finish()
    }
}

impl FormatterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `formatter` under `name`, replacing any previous one.
    pub fn register(&self, name: impl Into<String>, formatter: impl TextFormatter + 'static) {
        let name = name.into();
        tracing::debug!(formatter = %name, "registered formatter");
        self.formatters.write().insert(name, Arc::new(formatter));
    }

    /// Look up a formatter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn TextFormatter>> {
        self.formatters.read().get(name).cloned()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.formatters.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Which formatter, if any, a field applies to its compiled value.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatterSelection {
    /// No transformation; the value is sanitized instead.
    #[default]
    None,
    /// Apply the registered formatter with this name.
    Named(String),
}

impl FormatterSelection {
    /// Select a formatter by name; `""` and `"none"` mean no formatter.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("none") {
            Self::None
        } else {
            Self::Named(name.to_owned())
        }
    }
}

impl FromStr for FormatterSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for FormatterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl TextFormatter for Upper {
        fn run(&self, text: &str) -> anyhow::Result<String> {
            Ok(text.to_uppercase())
        }
    }

    #[test]
    fn test_should_register_and_lookup() {
        let registry = FormatterRegistry::new();
        registry.register("upper", Upper);
        registry.register("exclaim", |text: &str| -> anyhow::Result<String> { Ok(format!("{text}!")) });

        assert_eq!(registry.get("upper").unwrap().run("abc").unwrap(), "ABC");
        assert_eq!(registry.get("exclaim").unwrap().run("hi").unwrap(), "hi!");
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["exclaim", "upper"]);
    }

    #[test]
    fn test_should_replace_existing_registration() {
        let registry = FormatterRegistry::new();
        registry.register("f", |_: &str| -> anyhow::Result<String> { Ok("one".to_owned()) });
        registry.register("f", |_: &str| -> anyhow::Result<String> { Ok("two".to_owned()) });
        assert_eq!(registry.get("f").unwrap().run("").unwrap(), "two");
    }

    #[test]
    fn test_should_parse_selection() {
        assert_eq!(FormatterSelection::from_name("none"), FormatterSelection::None);
        assert_eq!(FormatterSelection::from_name(" NONE "), FormatterSelection::None);
        assert_eq!(FormatterSelection::from_name(""), FormatterSelection::None);
        assert_eq!(
            "markdown".parse::<FormatterSelection>().unwrap(),
            FormatterSelection::Named("markdown".to_owned())
        );
        assert_eq!(FormatterSelection::Named("x".to_owned()).to_string(), "x");
    }

    #[test]
    fn test_should_serialize_selection() {
        let json = serde_json::to_string(&FormatterSelection::Named("md".to_owned())).unwrap();
        assert_eq!(json, r#"{"named":"md"}"#);
        let none: FormatterSelection = serde_json::from_str(r#""none""#).unwrap();
        assert_eq!(none, FormatterSelection::None);
    }
}
