//! Question answering with optional web search context.

use super::notice::{Notice, NoticeSink};
use crate::conversation::Conversation;
use crate::llm::TextGenerator;
use crate::llm::prompts::qa_system_prompt;
use crate::search::WebSearch;
use std::sync::Arc;

/// Reply committed when no answer could be generated.
pub const QA_FAILURE_RESPONSE: &str = "Failed to generate an answer.";

/// Answers general questions.
pub struct QaHandler {
    generator: Arc<dyn TextGenerator>,
    search: Arc<dyn WebSearch>,
    search_results: usize,
}

impl QaHandler {
    /// Creates a handler.
    #[must_use]
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn WebSearch>,
        search_results: usize,
    ) -> Self {
        Self {
            generator,
            search,
            search_results,
        }
    }

    /// Builds the answer prompt: system prompt and context, prior turns, then the query.
    #[must_use]
    pub fn build_prompt(&self, history: &Conversation, query: &str, sink: &dyn NoticeSink) -> Conversation {
        let context = self.search.search_and_fetch(query, self.search_results);
        if context.is_empty() {
            sink.notify(Notice::NoContext);
        } else {
            sink.notify(Notice::ContextFound(context.len()));
        }
        tracing::debug!(documents = context.len(), "Search context collected");

        Conversation::from_system_message(qa_system_prompt(&context))
            .with_history(history)
            .with_user_message(query)
    }

    /// Produces the reply for `query` given the committed `history`.
    #[tracing::instrument(
        skip(self, history, query, sink),
        fields(provider = self.generator.name(), model = %self.generator.model(), history = history.len())
    )]
    pub fn answer(&self, history: &Conversation, query: &str, sink: &dyn NoticeSink) -> String {
        let prompt = self.build_prompt(history, query, sink);
        match self.generator.generate(&prompt) {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                tracing::warn!("QA generator returned an empty answer");
                QA_FAILURE_RESPONSE.to_string()
            },
            Err(e) => {
                tracing::warn!(error = %e, "QA generation failed");
                QA_FAILURE_RESPONSE.to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, SearchResult};
    use crate::pipeline::notice::SilentSink;
    use crate::search::NoWebSearch;
    use crate::{Error, Result};
    use std::sync::Mutex;

    struct Reply(Option<&'static str>);

    impl TextGenerator for Reply {
        fn name(&self) -> &'static str {
            "reply"
        }

        fn generate(&self, _conversation: &Conversation) -> Result<String> {
            self.0.map(str::to_string).ok_or_else(|| Error::OperationFailed {
                operation: "generate".to_string(),
                cause: "down".to_string(),
            })
        }
    }

    struct FixedSearch(Vec<SearchResult>);

    impl WebSearch for FixedSearch {
        fn search_and_fetch(&self, _query: &str, limit: usize) -> Vec<SearchResult> {
            self.0.iter().take(limit).cloned().collect()
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notice>>);

    impl NoticeSink for Recorder {
        fn notify(&self, notice: Notice) {
            self.0.lock().unwrap().push(notice);
        }
    }

    fn handler(reply: Option<&'static str>, search: Arc<dyn WebSearch>) -> QaHandler {
        QaHandler::new(Arc::new(Reply(reply)), search, 3)
    }

    #[test]
    fn test_prompt_carries_history_in_order() {
        let mut history = Conversation::new();
        history.append_user("What is smishing?");
        history.append_assistant("Phishing over SMS.");

        let qa = handler(Some("ok"), Arc::new(NoWebSearch));
        let prompt = qa.build_prompt(&history, "And vishing?", &SilentSink);

        let roles: Vec<Role> = prompt.history().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(prompt.history()[1].content(), "What is smishing?");
        assert_eq!(prompt.history()[3].content(), "And vishing?");
    }

    #[test]
    fn test_empty_search_degrades_to_no_context() {
        let recorder = Recorder::default();
        let qa = handler(Some("ok"), Arc::new(NoWebSearch));
        let prompt = qa.build_prompt(&Conversation::new(), "q", &recorder);

        assert!(!prompt.history()[0].content().contains("# Context"));
        assert_eq!(*recorder.0.lock().unwrap(), vec![Notice::NoContext]);
    }

    #[test]
    fn test_search_context_in_system_prompt() {
        let docs = (0..5)
            .map(|i| SearchResult {
                url: format!("https://{i}.example"),
                content: format!("doc {i}"),
            })
            .collect();
        let recorder = Recorder::default();
        let qa = handler(Some("ok"), Arc::new(FixedSearch(docs)));
        let prompt = qa.build_prompt(&Conversation::new(), "q", &recorder);

        let system = prompt.history()[0].content();
        assert!(system.contains("## Search Result 3"));
        assert!(!system.contains("## Search Result 4"));
        assert_eq!(recorder.0.lock().unwrap()[0], Notice::ContextFound(3));
    }

    #[test]
    fn test_answer_fallbacks() {
        let search: Arc<dyn WebSearch> = Arc::new(NoWebSearch);
        let history = Conversation::new();

        assert_eq!(handler(Some("Use MFA."), search.clone()).answer(&history, "q", &SilentSink), "Use MFA.");
        assert_eq!(handler(Some("  "), search.clone()).answer(&history, "q", &SilentSink), QA_FAILURE_RESPONSE);
        assert_eq!(handler(None, search).answer(&history, "q", &SilentSink), QA_FAILURE_RESPONSE);
    }
}
