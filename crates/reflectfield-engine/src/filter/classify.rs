//! Filter syntax classification.
//!
//! A filter is assigned exactly one syntax by testing its first token against
//! the markers below in priority order. The default syntax depends on whether
//! the caller combines tokens with AND.

use std::sync::LazyLock;

use regex::Regex;

use super::ast::MatchKind;

static REGEX_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(not-?)?regexp:\s*").expect("valid regex"));

static BOOLEAN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(not-)?(boolean|search):\s*").expect("valid regex"));

static PATTERN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(not-)?(starts-with|ends-with|contains):\s*").expect("valid regex")
});

/// A full numeric comparison phrase, e.g. `equal to or more than 5`.
pub(crate) static NUMERIC_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(equal to or )?(less than|more than|equal to) (-?\d+(?:\.\d+)?)$")
        .expect("valid regex")
});

/// The syntax a filter is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    /// `regexp:` / `not-regexp:` on the first token.
    Regex {
        /// The expression after the marker.
        pattern: String,
        /// Whether the marker was negated.
        negated: bool,
    },
    /// `boolean:` / `search:` with optional `not-`; every token joined with ` + `.
    Boolean {
        /// Raw query after the marker, trimmed.
        query: String,
        /// Whether the marker was negated.
        negated: bool,
    },
    /// `starts-with:`, `ends-with:` or `contains:` with optional `not-`.
    Pattern {
        /// Wildcard placement.
        kind: MatchKind,
        /// Text after the marker, trimmed.
        text: String,
        /// Whether the marker was negated.
        negated: bool,
    },
    /// Numeric comparison phrases (`less than 10`, `equal to or more than 3`).
    Numeric,
    /// Every token must match on its own join.
    Conjunctive,
    /// Any token may match.
    Disjunctive,
}

impl FilterKind {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Regex { .. } => "regex",
            Self::Boolean { .. } => "boolean",
            Self::Pattern { .. } => "pattern",
            Self::Numeric => "numeric",
            Self::Conjunctive => "conjunctive",
            Self::Disjunctive => "disjunctive",
        }
    }
}

/// Classify a filter by its first token.
#[must_use]
pub fn classify<T: AsRef<str>>(tokens: &[T], and_operation: bool) -> FilterKind {
    let first = tokens.first().map_or("", AsRef::as_ref);

    if let Some(caps) = REGEX_MARKER.captures(first) {
        return FilterKind::Regex {
            pattern: first[caps[0].len()..].to_owned(),
            negated: caps.get(1).is_some(),
        };
    }

    if let Some(caps) = BOOLEAN_MARKER.captures(first) {
        let joined = tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(" + ");
        let query = joined
            .split_once(':')
            .map_or("", |(_, rest)| rest)
            .trim()
            .to_owned();
        return FilterKind::Boolean {
            query,
            negated: caps.get(1).is_some(),
        };
    }

    if let Some(caps) = PATTERN_MARKER.captures(first) {
        if let Some(kind) = MatchKind::from_name(&caps[2]) {
            return FilterKind::Pattern {
                kind,
                text: first[caps[0].len()..].trim().to_owned(),
                negated: caps.get(1).is_some(),
            };
        }
    }

    if NUMERIC_PHRASE.is_match(first) {
        return FilterKind::Numeric;
    }

    if and_operation {
        FilterKind::Conjunctive
    } else {
        FilterKind::Disjunctive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_detect_regex_markers() {
        assert_eq!(
            classify(&["regexp: ^a.*"], false),
            FilterKind::Regex {
                pattern: "^a.*".to_owned(),
                negated: false
            }
        );
        assert_eq!(
            classify(&["NOT-REGEXP:x"], false),
            FilterKind::Regex {
                pattern: "x".to_owned(),
                negated: true
            }
        );
        assert!(matches!(
            classify(&["notregexp: y"], false),
            FilterKind::Regex { negated: true, .. }
        ));
    }

    #[test]
    fn test_should_join_all_tokens_for_boolean() {
        assert_eq!(
            classify(&["boolean: cats and dogs"], false),
            FilterKind::Boolean {
                query: "cats and dogs".to_owned(),
                negated: false
            }
        );
        assert_eq!(
            classify(&["not-search: cats", "dogs"], true),
            FilterKind::Boolean {
                query: "cats + dogs".to_owned(),
                negated: true
            }
        );
    }

    #[test]
    fn test_should_detect_pattern_prefixes() {
        assert_eq!(
            classify(&["not-contains: x"], false),
            FilterKind::Pattern {
                kind: MatchKind::Contains,
                text: "x".to_owned(),
                negated: true
            }
        );
        assert!(matches!(
            classify(&["starts-with:abc "], false),
            FilterKind::Pattern { kind: MatchKind::StartsWith, ref text, negated: false } if text == "abc"
        ));
        assert!(matches!(
            classify(&["ends-with: z"], false),
            FilterKind::Pattern { kind: MatchKind::EndsWith, .. }
        ));
    }

    #[test]
    fn test_should_keep_empty_remainders() {
        assert!(matches!(classify(&["contains:"], false), FilterKind::Pattern { ref text, .. } if text.is_empty()));
        assert!(matches!(classify(&["boolean:   "], false), FilterKind::Boolean { ref query, .. } if query.is_empty()));
    }

    #[test]
    fn test_should_detect_numeric_phrases() {
        assert_eq!(classify(&["more than 5", "less than 10"], true), FilterKind::Numeric);
        assert_eq!(classify(&["Equal To Or Less Than -2.5"], false), FilterKind::Numeric);
        assert_eq!(classify(&["more than five"], false), FilterKind::Disjunctive);
        assert_eq!(classify(&["more than 5 apples"], true), FilterKind::Conjunctive);
    }

    #[test]
    fn test_should_classify_only_on_first_token() {
        assert_eq!(classify(&["plain", "contains: x"], false), FilterKind::Disjunctive);
        assert_eq!(classify(&["plain", "more than 3"], true), FilterKind::Conjunctive);
    }

    #[test]
    fn test_should_fall_back_by_operation() {
        assert_eq!(classify(&["a", "b"], true), FilterKind::Conjunctive);
        assert_eq!(classify(&["a", "b"], false), FilterKind::Disjunctive);
        assert_eq!(classify::<&str>(&[], false), FilterKind::Disjunctive);
    }

    #[test]
    fn test_should_prefer_regex_over_other_markers() {
        assert!(matches!(classify(&["regexp: contains: x"], false), FilterKind::Regex { .. }));
        assert_eq!(classify(&["Contains: x"], false), FilterKind::Disjunctive);
    }
}
