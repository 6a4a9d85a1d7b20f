//! Progress notices emitted while a turn runs.

use crate::models::ModeKind;

/// A user-facing progress update.
///
/// Notices are transient. They are never committed to the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A pipeline was selected. For QA this also announces the web search.
    ModeSelected(ModeKind),
    /// Web search found this many documents.
    ContextFound(usize),
    /// Web search found nothing.
    NoContext,
    /// The phishing classifier produced a verdict.
    EvaluationComplete,
    /// The phishing classifier output could not be used.
    ClassificationFailed,
}

impl Notice {
    /// Returns the text shown to the user.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::ModeSelected(ModeKind::Qa) => {
                "Q&A mode detected. Performing web search for relevant information...".to_string()
            },
            Self::ModeSelected(ModeKind::PhishingDetection) => {
                "Phishing detection mode detected. Classifying email...".to_string()
            },
            Self::ContextFound(n) => format!("Found {n} relevant document(s). Generating response..."),
            Self::NoContext => {
                "No specific documents found via web search. Generating response based on general knowledge..."
                    .to_string()
            },
            Self::EvaluationComplete => {
                "Phishing evaluation completed. Generating response...".to_string()
            },
            Self::ClassificationFailed => "Failed to classify email.".to_string(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

/// Receives progress notices.
pub trait NoticeSink: Send + Sync {
    /// Called once per notice, in emission order.
    fn notify(&self, notice: Notice);
}

/// Sink that drops every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl NoticeSink for SilentSink {
    fn notify(&self, _notice: Notice) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text() {
        assert_eq!(
            Notice::ModeSelected(ModeKind::Qa).to_string(),
            "Q&A mode detected. Performing web search for relevant information..."
        );
        assert_eq!(
            Notice::ModeSelected(ModeKind::PhishingDetection).to_string(),
            "Phishing detection mode detected. Classifying email..."
        );
        assert_eq!(
            Notice::ContextFound(3).text(),
            "Found 3 relevant document(s). Generating response..."
        );
        assert_eq!(
            Notice::NoContext.text(),
            "No specific documents found via web search. Generating response based on general knowledge..."
        );
        assert_eq!(
            Notice::EvaluationComplete.text(),
            "Phishing evaluation completed. Generating response..."
        );
        assert_eq!(Notice::ClassificationFailed.text(), "Failed to classify email.");
    }
}
