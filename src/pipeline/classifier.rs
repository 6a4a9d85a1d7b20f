//! LLM-based intent classification.

use crate::conversation::Conversation;
use crate::llm::TextGenerator;
use crate::llm::prompts::{MODE_SYSTEM_PROMPT, mode_user_prompt};
use crate::models::Mode;
use crate::structured::{ParseError, extract_and_validate};
use std::sync::Arc;

/// Sorts a query into the QA or phishing-detection pipeline.
pub struct ModeClassifier {
    generator: Arc<dyn TextGenerator>,
}

impl ModeClassifier {
    /// Creates a classifier backed by `generator`.
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Parses a raw classifier completion into a [`Mode`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the completion is empty, holds no JSON
    /// object, or the object is not a valid mode.
    pub fn parse_completion(completion: &str) -> Result<Mode, ParseError> {
        extract_and_validate::<Mode>(completion)
    }

    /// Classifies `query`.
    ///
    /// A generator failure is logged and treated as an empty completion.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when no usable mode could be obtained. The
    /// caller decides the fallback.
    #[tracing::instrument(
        skip(self, query),
        fields(provider = self.generator.name(), model = %self.generator.model(), query_len = query.len())
    )]
    pub fn classify(&self, query: &str) -> Result<Mode, ParseError> {
        let prompt =
            Conversation::from_system_message(MODE_SYSTEM_PROMPT).with_user_message(mode_user_prompt(query));

        let completion = self.generator.generate(&prompt).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Mode classifier generation failed");
            String::new()
        });

        let result = Self::parse_completion(&completion);
        match &result {
            Ok(mode) => {
                tracing::debug!(mode = %mode.mode, reason = %mode.reason, "Classified query");
                metrics::counter!("mode_classification_total", "outcome" => "success").increment(1);
            },
            Err(e) => {
                tracing::warn!(error = %e, "Mode classification failed");
                metrics::counter!("mode_classification_total", "outcome" => e.as_str()).increment(1);
            },
        }
        result
    }
}
