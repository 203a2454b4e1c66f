//! String utility functions.

use regex::Regex;
use std::sync::OnceLock;

/// Capitalizes the first character of a string.
///
/// # Examples
///
/// ```
/// use backoffice_core::utils::text::capfirst;
///
/// assert_eq!(capfirst("hello"), "Hello");
/// assert_eq!(capfirst(""), "");
/// assert_eq!(capfirst("HELLO"), "HELLO");
/// ```
pub fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        let mut result = c.to_uppercase().to_string();
        result.extend(chars);
        result
    })
}

/// Trims the string and collapses every run of whitespace into one space.
///
/// # Examples
///
/// ```
/// use backoffice_core::utils::text::squish;
///
/// assert_eq!(squish("  Line   Items \n"), "Line Items");
/// ```
pub fn squish(s: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    whitespace.replace_all(s.trim(), " ").into_owned()
}

/// Keeps at most `n` characters of a string.
///
/// # Examples
///
/// ```
/// use backoffice_core::utils::text::truncate_chars;
///
/// assert_eq!(truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(truncate_chars("Hi", 10), "Hi");
/// ```
pub fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Returns `true` for strings that contain nothing but whitespace.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
