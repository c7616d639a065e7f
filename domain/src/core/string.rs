//! String utilities for the domain layer.

/// Single-line excerpt of `s`, at most `max_len` bytes including the ellipsis.
///
/// Whitespace runs (newlines included) collapse to one space. Truncation
/// happens on a UTF-8 character boundary.
pub fn excerpt(s: &str, max_len: usize) -> String {
    let flattened = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.len() <= max_len {
        return flattened;
    }

    let mut end = max_len.saturating_sub(3);
    while end > 0 && !flattened.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &flattened[..end])
}
