//! Similar emails returned by the retriever.

use super::{sanitize_preview, truncate_chars};
use crate::structured::{Fields, Schema, ValidationError, json_type_name};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ground-truth label of a reference email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailLabel {
    /// Legitimate email.
    Safe,
    /// Known phishing email.
    Phishing,
}

impl EmailLabel {
    /// Maps a dataset label code: `0` is safe, anything else is phishing.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        if code == 0 { Self::Safe } else { Self::Phishing }
    }

    /// Parses a label name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "safe" => Some(Self::Safe),
            "phishing" => Some(Self::Phishing),
            _ => None,
        }
    }

    /// Returns the label name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Phishing => "phishing",
        }
    }
}

impl std::fmt::Display for EmailLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference email similar to the one under analysis.
///
/// Validated shape:
/// `{"score": number, "text": string, "label": int | bool | "safe" | "phishing", "metadata": object}`.
/// Integer labels are coerced with [`EmailLabel::from_code`]; booleans count as
/// the codes `1` and `0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedEmail {
    /// Similarity score in `[0, 1]`.
    pub score: f64,
    /// Email body.
    pub text: String,
    /// Ground-truth label.
    pub label: EmailLabel,
    /// Extra columns carried by the index.
    pub metadata: Map<String, Value>,
}

impl RetrievedEmail {
    /// Number of body characters shown in prompt context.
    pub const PREVIEW_CHARS: usize = 100;

    /// Formats the email as prompt context.
    #[must_use]
    pub fn format(&self) -> String {
        format!(
            "Similarity Score: {:.2}%\nLabel: {}\nText: {}...",
            self.score * 100.0,
            self.label,
            sanitize_preview(truncate_chars(&self.text, Self::PREVIEW_CHARS))
        )
    }
}

impl Schema for RetrievedEmail {
    const NAME: &'static str = "RetrievedEmail";

    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let fields = Fields::of::<Self>(value)?;
        let score = fields.number("score")?;
        let text = fields.string("text")?;
        let label = match fields.required("label")? {
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(code), _) => EmailLabel::from_code(code),
                (None, Some(_)) => EmailLabel::Phishing,
                // JSON `-0` parses as a float.
                (None, None) if n.as_f64().is_some_and(|f| f.to_bits() == (-0.0_f64).to_bits()) => {
                    EmailLabel::Safe
                },
                (None, None) => {
                    return Err(fields.invalid("label", format!("must be an integer code, found {n}")));
                },
            },
            Value::Bool(b) => EmailLabel::from_code(i64::from(*b)),
            Value::String(s) => EmailLabel::parse(s).ok_or_else(|| {
                fields.invalid("label", format!("must be \"safe\" or \"phishing\", found \"{s}\""))
            })?,
            other => {
                return Err(fields.invalid(
                    "label",
                    format!("must be an integer, boolean or string, found {}", json_type_name(other)),
                ));
            },
        };
        let metadata = fields.object("metadata")?;
        Ok(Self {
            score,
            text,
            label,
            metadata,
        })
    }
}
