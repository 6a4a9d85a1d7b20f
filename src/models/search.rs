//! Web search results used as Q&A context.

use super::truncate_chars;
use crate::structured::{Fields, Schema, ValidationError};
use serde::Serialize;
use serde_json::Value;

/// A fetched web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Page URL. Never empty.
    pub url: String,
    /// Extracted page text.
    pub content: String,
}

impl SearchResult {
    /// Number of content characters shown in prompt context.
    pub const PREVIEW_CHARS: usize = 1000;

    /// Formats the result as prompt context.
    #[must_use]
    pub fn format(&self) -> String {
        format!(
            "URL: {}\nContent:\n```\n{}...\n```",
            self.url,
            truncate_chars(&self.content, Self::PREVIEW_CHARS)
        )
    }
}

impl Schema for SearchResult {
    const NAME: &'static str = "SearchResult";

    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let fields = Fields::of::<Self>(value)?;
        let url = fields.string("url")?;
        if url.trim().is_empty() {
            return Err(fields.invalid("url", "must not be empty"));
        }
        let content = fields.string("content")?;
        Ok(Self { url, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured::validate;

    #[test]
    fn test_empty_url_rejected() {
        let err = validate::<SearchResult>(r#"{"url": " ", "content": "c"}"#).unwrap_err();
        assert_eq!(err.to_string(), "SearchResult: field 'url' must not be empty");
    }

    #[test]
    fn test_format_truncates_content() {
        let result = SearchResult {
            url: "https://example.com/phishing".to_string(),
            content: "é".repeat(1500),
        };
        let formatted = result.format();
        assert!(formatted.starts_with("URL: https://example.com/phishing\nContent:\n```\n"));
        assert!(formatted.ends_with("...\n```"));
        assert_eq!(formatted.matches('é').count(), 1000);
    }
}
