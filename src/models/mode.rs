//! Routing decision produced by the mode classifier.

use crate::structured::{Fields, Schema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which pipeline handles a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    /// General question answering, including questions *about* phishing.
    Qa,
    /// Analysis of a specific email, URL, or message the user supplied.
    PhishingDetection,
}

impl ModeKind {
    /// Parses the wire label. Matching is exact.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "qa" => Some(Self::Qa),
            "phishing_detection" => Some(Self::PhishingDetection),
            _ => None,
        }
    }

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Qa => "qa",
            Self::PhishingDetection => "phishing_detection",
        }
    }
}

impl std::fmt::Display for ModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classified intent for one user turn.
///
/// Validated shape: `{"reason": string, "mode": "qa" | "phishing_detection"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mode {
    /// The classifier's rationale.
    pub reason: String,
    /// The selected pipeline.
    pub mode: ModeKind,
}

impl Mode {
    /// Rationale recorded when classification fails and QA is forced.
    pub const DEFAULT_REASON: &'static str = "Failed to determine mode. Defaulting to QA.";

    /// Creates a mode decision.
    #[must_use]
    pub fn new(mode: ModeKind, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            mode,
        }
    }

    /// The fallback decision used when classification fails.
    #[must_use]
    pub fn defaulted() -> Self {
        Self::new(ModeKind::Qa, Self::DEFAULT_REASON)
    }
}

impl Schema for Mode {
    const NAME: &'static str = "Mode";

    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let fields = Fields::of::<Self>(value)?;
        let reason = fields.string("reason")?;
        let label = fields.string("mode")?;
        let mode = ModeKind::parse(&label).ok_or_else(|| {
            fields.invalid(
                "mode",
                format!("must be \"qa\" or \"phishing_detection\", found \"{label}\""),
            )
        })?;
        Ok(Self { reason, mode })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured::validate;

    #[test]
    fn test_mode_validates() {
        let mode: Mode = validate(r#"{"reason":"general question","mode":"qa"}"#).unwrap();
        assert_eq!(mode, Mode::new(ModeKind::Qa, "general question"));

        let mode: Mode =
            validate(r#"{"reason":"email supplied","mode":"phishing_detection"}"#).unwrap();
        assert_eq!(mode.mode, ModeKind::PhishingDetection);
    }

    #[test]
    fn test_mode_rejects_unknown_label() {
        let err = validate::<Mode>(r#"{"reason":"r","mode":"QA"}"#).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field: "mode", .. }));
    }

    #[test]
    fn test_mode_requires_reason() {
        let err = validate::<Mode>(r#"{"mode":"qa"}"#).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                schema: "Mode",
                field: "reason"
            }
        );
    }

    #[test]
    fn test_defaulted() {
        let mode = Mode::defaulted();
        assert_eq!(mode.mode, ModeKind::Qa);
        assert_eq!(mode.reason, Mode::DEFAULT_REASON);
    }

    #[test]
    fn test_serializes_to_wire_shape() {
        let json = serde_json::to_string(&Mode::new(ModeKind::PhishingDetection, "r")).unwrap();
        assert_eq!(json, r#"{"reason":"r","mode":"phishing_detection"}"#);
    }
}
