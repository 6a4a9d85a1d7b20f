//! Structured data extraction from free-form model output.
//!
//! # Flow
//!
//! ```text
//! raw completion ──► extract() ──► span ──► validate::<S>() ──► S
//!        │                │                        │
//!        └─ EmptyResponse └─ NotFound              └─ Invalid(ValidationError)
//! ```
//!
//! [`extract_and_validate`] composes both stages and is what the pipeline
//! calls. Nothing here panics or returns a partially filled record.

mod extractor;
mod validator;

pub use extractor::extract;
pub use validator::{Fields, Schema, ValidationError, json_type_name, validate};

use thiserror::Error as ThisError;

/// Why a completion could not be turned into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ParseError {
    /// The generator returned no text at all.
    #[error("generator returned an empty response")]
    EmptyResponse,

    /// No balanced JSON object was found in the text.
    #[error("no JSON object found in response")]
    NotFound,

    /// A JSON object was found but failed schema validation.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationError),
}

impl ParseError {
    /// Short label for metrics and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyResponse => "empty",
            Self::NotFound => "not_found",
            Self::Invalid(_) => "invalid",
        }
    }
}

/// Extracts the first JSON object from `raw` and validates it as `S`.
///
/// # Errors
///
/// Returns [`ParseError::EmptyResponse`] for blank input,
/// [`ParseError::NotFound`] if no balanced object exists, and
/// [`ParseError::Invalid`] if the object does not satisfy `S`.
///
/// # Examples
///
/// ```rust
/// use phishwise::{Mode, ModeKind, extract_and_validate};
///
/// let raw = r#"Sure. {"reason": "general question", "mode": "qa"} Anything else?"#;
/// let mode: Mode = extract_and_validate(raw).unwrap();
/// assert_eq!(mode.mode, ModeKind::Qa);
/// ```
pub fn extract_and_validate<S: Schema>(raw: &str) -> Result<S, ParseError> {
    let result = parse(raw);
    let outcome = result.as_ref().map_or_else(ParseError::as_str, |_| "success");
    metrics::counter!(
        "structured_parse_total",
        "schema" => S::NAME,
        "outcome" => outcome
    )
    .increment(1);

    if let Err(ref e) = result {
        tracing::debug!(schema = S::NAME, error = %e, "Structured parse failed");
    }
    result
}

fn parse<S: Schema>(raw: &str) -> Result<S, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyResponse);
    }
    let span = extract(raw).ok_or(ParseError::NotFound)?;
    Ok(validate::<S>(span)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mode, PhishingEvaluation};

    #[test]
    fn test_empty_response() {
        assert_eq!(
            extract_and_validate::<Mode>("   \n").unwrap_err(),
            ParseError::EmptyResponse
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(
            extract_and_validate::<Mode>("I cannot comply").unwrap_err(),
            ParseError::NotFound
        );
        assert_eq!(
            extract_and_validate::<PhishingEvaluation>("true").unwrap_err(),
            ParseError::NotFound
        );
    }

    #[test]
    fn test_invalid() {
        let err = extract_and_validate::<Mode>(r#"{"reason": "x", "mode": "chat"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
        assert_eq!(err.as_str(), "invalid");
    }

    #[test]
    fn test_prose_wrapped_success() {
        let raw = "Analysis below.\n{\"reason\": \"it {asks}\", \"mode\": \"phishing_detection\"}\nDone.";
        let mode: Mode = extract_and_validate(raw).unwrap();
        assert_eq!(mode.reason, "it {asks}");
    }
}
