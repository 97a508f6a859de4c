//! Placeholder extraction and path normalization.

use std::sync::LazyLock;

use regex::Regex;

/// A `{...}` span with no nested braces. An opening brace with no closing
/// brace is left alone.
pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("valid regex"));

/// Distinct placeholder spans of `template`, braces included, in first-seen order.
#[must_use]
pub fn extract_placeholders(template: &str) -> Vec<&str> {
    let mut spans: Vec<&str> = Vec::new();
    for m in PLACEHOLDER.find_iter(template) {
        if !spans.contains(&m.as_str()) {
            spans.push(m.as_str());
        }
    }
    spans
}

/// Turn a placeholder's inner text into a path query.
///
/// Rules are tried in order and the first match wins:
///
/// 1. `entry/...` searches anywhere: `//...`
/// 2. `/entry/...` is rooted: `/...`
/// 3. a path starting with the root element name is made absolute
/// 4. `(` followed by the root element name gets a `/` inserted after the `(`
/// 5. `/` alone selects the root element
///
/// Rules 3 and 4 only apply when the document has a root element.
#[must_use]
pub fn normalize(expression: &str, root_name: &str) -> String {
    if let Some(rest) = expression.strip_prefix("entry/") {
        return format!("//{rest}");
    }
    if let Some(rest) = expression.strip_prefix("/entry/") {
        return format!("/{rest}");
    }
    if !root_name.is_empty() {
        if expression.starts_with(root_name) {
            return format!("/{expression}");
        }
        let call = format!("({root_name}");
        if expression.contains(&call) {
            return expression.replacen(&call, &format!("(/{root_name}"), 1);
        }
    }
    if expression == "/" {
        return format!("/{root_name}");
    }
    expression.to_owned()
}

/// Inner text of a `{...}` span.
#[must_use]
pub fn inner(span: &str) -> &str {
    span.strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(span)
}
