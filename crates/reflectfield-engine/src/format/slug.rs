//! Handle (URL slug) generation.

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Runs of characters allowed in a handle.
static LEGAL_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"[^!"#$%&'()*+,\-./:;<>?@\[\\\]^_`‘’…]+"##).expect("valid regex")
});

/// Default maximum handle length in characters.
pub const DEFAULT_HANDLE_MAX_LENGTH: usize = 255;

/// Derive a lowercase, dash-separated handle from `text`.
///
/// Tags are stripped, dots and quotes removed, the text cut to `max_length`
/// characters, and every run of punctuation or whitespace collapsed into a
/// single `-`. Returns `None` when nothing survives.
///
/// # Examples
///
/// ```
/// use reflectfield_engine::format::create_handle;
///
/// assert_eq!(create_handle("Hello, World!", 255).as_deref(), Some("hello-world"));
/// assert_eq!(create_handle("...", 255), None);
/// ```
#[must_use]
pub fn create_handle(text: &str, max_length: usize) -> Option<String> {
    let stripped = TAG.replace_all(text, "");
    let cleaned: String = stripped
        .chars()
        .filter(|c| !matches!(c, '.' | '\'' | '"'))
        .take(max_length)
        .collect();
    let dashed = WHITESPACE.replace_all(cleaned.trim(), "-");
    let handle = LEGAL_RUN
        .find_iter(&dashed)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    (!handle.is_empty()).then_some(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(text: &str) -> Option<String> {
        create_handle(text, DEFAULT_HANDLE_MAX_LENGTH)
    }

    #[test]
    fn test_should_slug_words() {
        assert_eq!(handle("Hello World").as_deref(), Some("hello-world"));
        assert_eq!(handle("  Spaced   out  ").as_deref(), Some("spaced-out"));
    }

    #[test]
    fn test_should_collapse_punctuation() {
        assert_eq!(handle("Rock & Roll -- Live!").as_deref(), Some("rock-roll-live"));
        assert_eq!(handle("snake_case_name").as_deref(), Some("snake-case-name"));
        assert_eq!(handle("a/b\\c").as_deref(), Some("a-b-c"));
    }

    #[test]
    fn test_should_drop_dots_and_quotes() {
        assert_eq!(handle("v1.2.3").as_deref(), Some("v123"));
        assert_eq!(handle(r#"Don't "quote""#).as_deref(), Some("dont-quote"));
    }

    #[test]
    fn test_should_strip_tags() {
        assert_eq!(handle("<em>Bold</em> move").as_deref(), Some("bold-move"));
    }

    #[test]
    fn test_should_keep_unicode_letters() {
        assert_eq!(handle("Ünïcödé Straße").as_deref(), Some("ünïcödé-straße"));
        assert_eq!(handle("‘quoted’ …").as_deref(), Some("quoted"));
    }

    #[test]
    fn test_should_truncate_to_max_length() {
        assert_eq!(create_handle("abcdef ghi", 4).as_deref(), Some("abcd"));
        assert_eq!(create_handle("ab cdef", 4).as_deref(), Some("ab-c"));
    }

    #[test]
    fn test_should_return_none_for_empty_result() {
        assert_eq!(handle(""), None);
        assert_eq!(handle("   "), None);
        assert_eq!(handle("?!."), None);
        assert_eq!(handle("<br/>"), None);
    }

    #[test]
    fn test_should_be_idempotent() {
        for input in ["Hello World", "Rock & Roll", "Ünïcödé Straße", "a--b", "X_Y.Z", "{curly} = ok"] {
            let once = handle(input).unwrap();
            assert_eq!(handle(&once).as_deref(), Some(once.as_str()), "input {input:?}");
        }
    }
}
