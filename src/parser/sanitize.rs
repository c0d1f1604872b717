//! Text normalization helpers for extracted page text

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs into single spaces and trim the ends
///
/// # Examples
///
/// ```
/// use sitesearch::parser::sanitize::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// Truncate to at most `max_chars` characters, respecting char boundaries
///
/// # Examples
///
/// ```
/// use sitesearch::parser::sanitize::truncate_chars;
///
/// assert_eq!(truncate_chars("привет", 3), "при");
/// assert_eq!(truncate_chars("hi", 10), "hi");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
