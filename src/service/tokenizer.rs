use regex::Regex;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,.\-_]+").expect("separator pattern is valid"));

/// Splits free text into lower-cased words.
///
/// Whitespace and `,` `.` `-` `_` all separate words; empty fragments are dropped.
pub fn split_phrase(text: &str) -> Vec<String> {
    SEPARATORS
        .split(text)
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect()
}

/// Splits a comma-separated term list, keeping request order.
pub fn split_terms(terms: &str) -> Vec<String> {
    terms
        .split(',')
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}
