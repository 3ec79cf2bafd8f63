//! Small text helpers shared across the pipeline.

use crate::constants::REGEXPS;

/// Collapse every whitespace run into a single space.
pub fn normalize_whitespace(text: &str) -> String {
    REGEXPS.normalize.replace_all(text, " ").to_string()
}

/// Strip leading and trailing whitespace on every line.
pub fn trim_lines(text: &str) -> String {
    REGEXPS.trim.replace_all(text, "").to_string()
}

/// Number of Unicode scalar values in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Strip leading and trailing ASCII punctuation from a word.
pub fn strip_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| c.is_ascii_punctuation())
}
