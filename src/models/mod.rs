//! Data models for phishwise.
//!
//! Schema-typed records ([`Mode`], [`PhishingEvaluation`], [`RetrievedEmail`],
//! [`SearchResult`]) implement [`crate::structured::Schema`], so they only
//! exist fully validated.

mod email;
mod message;
mod mode;
mod phishing;
mod search;

pub use email::{EmailLabel, RetrievedEmail};
pub use message::{Message, Role};
pub use mode::{Mode, ModeKind};
pub use phishing::PhishingEvaluation;
pub use search::SearchResult;

/// Replaces line breaks with spaces for single-line previews.
#[must_use]
pub fn sanitize_preview(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Returns at most the first `max_chars` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_preview() {
        assert_eq!(sanitize_preview("a\r\nb\nc"), "a  b c");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("ñandú", 3), "ñan");
        assert_eq!(truncate_chars("", 3), "");
    }
}
