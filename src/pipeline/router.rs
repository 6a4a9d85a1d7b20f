//! Turn orchestration: classify, dispatch, commit.

use super::classifier::ModeClassifier;
use super::notice::{Notice, NoticeSink, SilentSink};
use super::phishing::PhishingHandler;
use super::qa::QaHandler;
use crate::conversation::Session;
use crate::llm::TextGenerator;
use crate::models::{Mode, ModeKind};
use crate::retrieval::{EmailRetriever, NoRetriever};
use crate::search::{NoWebSearch, WebSearch};
use crate::{Error, Result};
use std::sync::Arc;

/// Result of one routed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The mode that handled the turn, after any fallback.
    pub mode: Mode,
    /// Whether classification failed and QA was forced.
    pub defaulted: bool,
    /// The reply committed to the conversation.
    pub response: String,
}

/// Routes user queries to the QA or phishing pipeline.
///
/// The router is stateless between turns. All per-turn state lives in the
/// caller's [`Session`].
pub struct Router {
    classifier: ModeClassifier,
    qa: QaHandler,
    phishing: PhishingHandler,
    notices: Arc<dyn NoticeSink>,
}

impl Router {
    /// Starts building a router.
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Handles one user turn and returns the reply.
    pub fn route(&self, session: &mut Session, query: &str) -> String {
        self.route_turn(session, query).response
    }

    /// Handles one user turn.
    ///
    /// Exactly one user message and one assistant message are appended to the
    /// session's conversation, whatever the outcome.
    #[tracing::instrument(skip(self, session, query), fields(session_id = %session.id(), mode = tracing::field::Empty))]
    pub fn route_turn(&self, session: &mut Session, query: &str) -> TurnOutcome {
        let (mode, defaulted) = match self.classifier.classify(query) {
            Ok(mode) => (mode, false),
            Err(e) => {
                tracing::warn!(error = %e, "Defaulting to QA");
                (Mode::defaulted(), true)
            },
        };
        tracing::Span::current().record("mode", mode.mode.as_str());
        metrics::counter!("route_turns_total", "mode" => mode.mode.as_str()).increment(1);

        self.notices.notify(Notice::ModeSelected(mode.mode));
        let response = match mode.mode {
            ModeKind::Qa => self
                .qa
                .answer(session.conversation(), query, self.notices.as_ref()),
            ModeKind::PhishingDetection => self.phishing.respond(query, self.notices.as_ref()),
        };

        let conversation = session.conversation_mut();
        conversation.append_user(query);
        conversation.append_assistant(response.clone());
        tracing::info!(defaulted, history = conversation.len(), "Turn committed");

        TurnOutcome {
            mode,
            defaulted,
            response,
        }
    }
}

/// Builder for [`Router`].
pub struct RouterBuilder {
    classifier: Option<Arc<dyn TextGenerator>>,
    qa: Option<Arc<dyn TextGenerator>>,
    phishing: Option<Arc<dyn TextGenerator>>,
    retriever: Arc<dyn EmailRetriever>,
    search: Arc<dyn WebSearch>,
    search_results: usize,
    notices: Arc<dyn NoticeSink>,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self {
            classifier: None,
            qa: None,
            phishing: None,
            retriever: Arc::new(NoRetriever),
            search: Arc::new(NoWebSearch),
            search_results: Self::DEFAULT_SEARCH_RESULTS,
            notices: Arc::new(SilentSink),
        }
    }
}

impl RouterBuilder {
    /// Default number of search documents given to the QA generator.
    pub const DEFAULT_SEARCH_RESULTS: usize = 3;

    /// Sets the mode classifier generator.
    #[must_use]
    pub fn classifier(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.classifier = Some(generator);
        self
    }

    /// Sets the QA generator.
    #[must_use]
    pub fn qa(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.qa = Some(generator);
        self
    }

    /// Sets the phishing classifier generator.
    #[must_use]
    pub fn phishing(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.phishing = Some(generator);
        self
    }

    /// Sets the similar-email retriever.
    #[must_use]
    pub fn retriever(mut self, retriever: Arc<dyn EmailRetriever>) -> Self {
        self.retriever = retriever;
        self
    }

    /// Sets the web search backend.
    #[must_use]
    pub fn search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = search;
        self
    }

    /// Sets how many search documents the QA generator sees.
    #[must_use]
    pub const fn search_results(mut self, count: usize) -> Self {
        self.search_results = count;
        self
    }

    /// Sets the progress notice sink.
    #[must_use]
    pub fn notices(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.notices = sink;
        self
    }

    /// Builds the router.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any of the three generators is missing.
    pub fn build(self) -> Result<Router> {
        let missing = |role: &str| Error::InvalidInput(format!("{role} generator is required"));
        let classifier = self.classifier.ok_or_else(|| missing("classifier"))?;
        let qa = self.qa.ok_or_else(|| missing("qa"))?;
        let phishing = self.phishing.ok_or_else(|| missing("phishing"))?;

        Ok(Router {
            classifier: ModeClassifier::new(classifier),
            qa: QaHandler::new(qa, self.search, self.search_results),
            phishing: PhishingHandler::new(phishing, self.retriever),
            notices: self.notices,
        })
    }
}
