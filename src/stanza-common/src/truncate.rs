//! Text truncation utilities.

use std::borrow::Cow;

use crate::tokens::chars_for_tokens;

/// Truncates a string to a maximum character count, adding ellipsis if
/// truncated.
///
/// # Examples
/// ```
/// use stanza_common::truncate::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
/// assert_eq!(truncate_with_ellipsis("hello world", 8), "hello...");
/// ```
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_len {
        Cow::Borrowed(s)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        Cow::Owned(format!("{}...", truncated))
    }
}

/// Truncates a string to fit a token allotment.
///
/// The allotment is converted to a character capacity with the shared
/// estimator; the ellipsis counts against the capacity, so the result never
/// estimates above the allotment.
pub fn truncate_to_tokens(s: &str, max_tokens: usize) -> Cow<'_, str> {
    truncate_with_ellipsis(s, chars_for_tokens(max_tokens))
}
