// src/util/text.rs
use regex::Regex;

use crate::constants::ELLIPSIS;

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    let whitespace_re = Regex::new(r"\s+").expect("valid whitespace pattern");
    whitespace_re.replace_all(text.trim(), " ").into_owned()
}

/// Shorten a matched chunk for display.
///
/// This function:
/// 1. Collapses whitespace so chunks render on one line
/// 2. Keeps at most `max_chars` characters (not bytes)
/// 3. Appends an ellipsis marker when anything was cut
///
/// # Examples
///
/// ```
/// use smartnotes::util::text::truncate_excerpt;
///
/// assert_eq!(truncate_excerpt("Borrowing rules", 9), "Borrowing...");
/// assert_eq!(truncate_excerpt("short", 9), "short");
/// ```
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let kept: String = collapsed.chars().take(max_chars).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

/// First non-empty line of note content, used as a one-line preview.
pub fn first_line(content: &str) -> &str {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}
