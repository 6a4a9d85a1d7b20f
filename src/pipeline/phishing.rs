//! Phishing classification grounded on similar labeled emails.

use super::notice::{Notice, NoticeSink};
use crate::conversation::Conversation;
use crate::llm::TextGenerator;
use crate::llm::prompts::{PHISHING_SYSTEM_PROMPT, phishing_user_prompt};
use crate::models::PhishingEvaluation;
use crate::retrieval::EmailRetriever;
use crate::structured::{ParseError, extract_and_validate};
use std::sync::Arc;

/// Reply committed when the classifier output is unusable.
pub const PHISHING_FAILURE_RESPONSE: &str = "Failed to classify email.";

/// Evaluates a supplied email.
pub struct PhishingHandler {
    generator: Arc<dyn TextGenerator>,
    retriever: Arc<dyn EmailRetriever>,
}

impl PhishingHandler {
    /// Creates a handler.
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, retriever: Arc<dyn EmailRetriever>) -> Self {
        Self {
            generator,
            retriever,
        }
    }

    /// Builds the one-shot classifier prompt for `query`.
    #[must_use]
    pub fn build_prompt(&self, query: &str) -> Conversation {
        let similar = self.retriever.retrieve(query).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Similar email retrieval failed");
            Vec::new()
        });
        tracing::debug!(similar = similar.len(), "Similar emails retrieved");

        Conversation::from_system_message(PHISHING_SYSTEM_PROMPT)
            .with_user_message(phishing_user_prompt(query, &similar))
    }

    /// Runs the classifier and validates its verdict.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the completion is empty or holds no valid
    /// evaluation. A generator failure counts as an empty completion.
    #[tracing::instrument(
        skip(self, query),
        fields(provider = self.generator.name(), model = %self.generator.model())
    )]
    pub fn evaluate(&self, query: &str) -> Result<PhishingEvaluation, ParseError> {
        let prompt = self.build_prompt(query);
        let completion = self.generator.generate(&prompt).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Phishing classifier generation failed");
            String::new()
        });

        let result = extract_and_validate::<PhishingEvaluation>(&completion);
        let outcome = result.as_ref().map_or_else(ParseError::as_str, |_| "success");
        metrics::counter!("phishing_classification_total", "outcome" => outcome).increment(1);
        result
    }

    /// Produces the reply for `query`. Never falls back to another pipeline.
    pub fn respond(&self, query: &str, sink: &dyn NoticeSink) -> String {
        match self.evaluate(query) {
            Ok(evaluation) => {
                tracing::info!(is_phishing = evaluation.is_phishing, "Email classified");
                sink.notify(Notice::EvaluationComplete);
                evaluation.render()
            },
            Err(e) => {
                tracing::warn!(error = %e, "Phishing classification failed");
                sink.notify(Notice::ClassificationFailed);
                PHISHING_FAILURE_RESPONSE.to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmailLabel, RetrievedEmail};
    use crate::pipeline::notice::SilentSink;
    use crate::retrieval::NoRetriever;
    use crate::{Error, Result};
    use serde_json::Map;

    struct Reply(&'static str);

    impl TextGenerator for Reply {
        fn name(&self) -> &'static str {
            "reply"
        }

        fn generate(&self, _conversation: &Conversation) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenIndex;

    impl EmailRetriever for BrokenIndex {
        fn retrieve(&self, _query: &str) -> Result<Vec<RetrievedEmail>> {
            Err(Error::OperationFailed {
                operation: "retrieve".to_string(),
                cause: "index missing".to_string(),
            })
        }
    }

    struct OneEmail;

    impl EmailRetriever for OneEmail {
        fn retrieve(&self, _query: &str) -> Result<Vec<RetrievedEmail>> {
            Ok(vec![RetrievedEmail {
                score: 0.9,
                text: "Your parcel is held, pay the fee".to_string(),
                label: EmailLabel::Phishing,
                metadata: Map::new(),
            }])
        }
    }

    const VERDICT: &str = r#"Here you go: {"reason": "Fee demand with a link", "explanation": "Couriers do not ask for fees by email.", "is_phishing": "true"}"#;

    #[test]
    fn test_prompt_includes_similar_emails() {
        let handler = PhishingHandler::new(Arc::new(Reply(VERDICT)), Arc::new(OneEmail));
        let prompt = handler.build_prompt("Parcel held, pay now");
        assert_eq!(prompt.history()[0].content(), PHISHING_SYSTEM_PROMPT);
        assert!(prompt.history()[1].content().contains("Label: phishing"));
    }

    #[test]
    fn test_retriever_failure_means_no_similar_emails() {
        let handler = PhishingHandler::new(Arc::new(Reply(VERDICT)), Arc::new(BrokenIndex));
        let prompt = handler.build_prompt("email");
        assert!(prompt.history()[1].content().contains("No similar emails were found."));
        assert!(handler.evaluate("email").unwrap().is_phishing);
    }

    #[test]
    fn test_respond_renders_verdict() {
        let handler = PhishingHandler::new(Arc::new(Reply(VERDICT)), Arc::new(NoRetriever));
        let reply = handler.respond("email", &SilentSink);
        assert!(reply.starts_with("### Phishing Evaluation\nEmail is detected as **PHISHING**."));
        assert!(reply.contains("### Reason\nFee demand with a link"));
    }

    #[test]
    fn test_unusable_output_is_failure() {
        for raw in ["true", "", r#"{"reason": "r", "is_phishing": true}"#] {
            let handler = PhishingHandler::new(Arc::new(Reply(raw)), Arc::new(NoRetriever));
            assert_eq!(handler.respond("email", &SilentSink), PHISHING_FAILURE_RESPONSE);
        }
    }
}
