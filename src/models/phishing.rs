//! Verdict produced by the phishing classifier.

use crate::structured::{Fields, Schema, ValidationError, json_type_name};
use serde::Serialize;
use serde_json::Value;

/// Phishing verdict for one email.
///
/// Validated shape:
/// `{"reason": string, "explanation": string, "is_phishing": bool}`.
/// `is_phishing` also accepts the integers `0`/`1` and, case-insensitively,
/// the strings `true`/`false`, `t`/`f`, `yes`/`no`, `y`/`n`, `on`/`off` and
/// `1`/`0`, which small models emit in place of a JSON boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhishingEvaluation {
    /// Short technical reason for the verdict.
    pub reason: String,
    /// Plain-language explanation for the user.
    pub explanation: String,
    /// Whether the email is a phishing attempt.
    pub is_phishing: bool,
}

impl PhishingEvaluation {
    /// Returns the verdict label shown to the user.
    #[must_use]
    pub const fn verdict(&self) -> &'static str {
        if self.is_phishing {
            "PHISHING"
        } else {
            "NOT PHISHING"
        }
    }

    /// Renders the evaluation as the markdown reply committed to the conversation.
    ///
    /// Only the rendered block is trimmed, so leading whitespace inside the
    /// reason is kept.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "### Phishing Evaluation\nEmail is detected as **{}**.\n### Reason\n{}\n### Explanation\n{}",
            self.verdict(),
            self.reason,
            self.explanation
        )
        .trim()
        .to_string()
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl Schema for PhishingEvaluation {
    const NAME: &'static str = "PhishingEvaluation";

    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let fields = Fields::of::<Self>(value)?;
        let reason = fields.string("reason")?;
        let explanation = fields.string("explanation")?;
        let raw = fields.required("is_phishing")?;
        let is_phishing = match raw {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_u64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Value::String(s) => parse_bool(s),
            _ => None,
        }
        .ok_or_else(|| {
            fields.invalid(
                "is_phishing",
                format!("must be a boolean, found {}", json_type_name(raw)),
            )
        })?;
        Ok(Self {
            reason,
            explanation,
            is_phishing,
        })
    }
}
