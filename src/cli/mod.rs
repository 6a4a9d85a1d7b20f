//! Assembly of the assistant from configuration.
//!
//! The binary parses arguments and prints. Everything it needs to wire a
//! [`Router`] from an [`AssistantConfig`] lives here.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ask` | Route one query and print the reply |
//! | `chat` | Interactive session over stdin |
//! | `classify` | Run the phishing classifier on an email directly |
//! | `config` | Show the resolved configuration |
//!
//! # Example Usage
//!
//! ```bash
//! phishwise ask "What are common signs of phishing?"
//! phishwise classify "$(cat suspicious.eml)"
//! PHISHWISE_SEARCH_ENDPOINT=http://localhost:8080 phishwise chat
//! ```

mod llm_factory;

pub use llm_factory::{build_generator, build_http_config, build_ollama_client, build_openai_client};

use crate::config::AssistantConfig;
use crate::pipeline::{NoticeSink, PhishingHandler, Router};
use crate::retrieval::{EmailRetriever, NoRetriever, SqliteEmailIndex};
use crate::search::{NoWebSearch, SearxSearch, WebSearch};
use crate::Result;
use std::sync::Arc;

/// Opens the similar-email index, or a retriever that finds nothing.
///
/// # Errors
///
/// Returns an error if an index path is configured but cannot be opened.
pub fn build_retriever(config: &AssistantConfig) -> Result<Arc<dyn EmailRetriever>> {
    match config.retrieval.index_path {
        Some(ref path) => {
            let index = SqliteEmailIndex::open(path)?.with_top_k(config.retrieval.top_k);
            tracing::info!(path = %path.display(), top_k = config.retrieval.top_k, "Opened email index");
            Ok(Arc::new(index))
        },
        None => {
            tracing::info!("No email index configured; phishing prompts get no similar emails");
            Ok(Arc::new(NoRetriever))
        },
    }
}

/// Builds the web search backend.
#[must_use]
pub fn build_search(config: &AssistantConfig) -> Arc<dyn WebSearch> {
    if config.search.enabled {
        Arc::new(
            SearxSearch::new(&config.search.endpoint).with_candidates(config.search.candidates),
        )
    } else {
        Arc::new(NoWebSearch)
    }
}

/// Builds the router with the configured generators and collaborators.
///
/// # Errors
///
/// Returns an error if the email index cannot be opened.
pub fn build_router(config: &AssistantConfig, notices: Arc<dyn NoticeSink>) -> Result<Router> {
    Router::builder()
        .classifier(build_generator(&config.llm, &config.models.classifier))
        .qa(build_generator(&config.llm, &config.models.qa))
        .phishing(build_generator(&config.llm, &config.models.phishing))
        .retriever(build_retriever(config)?)
        .search(build_search(config))
        .search_results(config.search.results)
        .notices(notices)
        .build()
}

/// Builds a standalone phishing handler for direct classification.
///
/// # Errors
///
/// Returns an error if the email index cannot be opened.
pub fn build_phishing_handler(config: &AssistantConfig) -> Result<PhishingHandler> {
    Ok(PhishingHandler::new(
        build_generator(&config.llm, &config.models.phishing),
        build_retriever(config)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentSink;

    #[test]
    fn test_build_router_with_defaults() {
        let config = AssistantConfig::default();
        assert!(build_router(&config, Arc::new(SilentSink)).is_ok());
    }

    #[test]
    fn test_missing_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AssistantConfig::default();
        config.retrieval.index_path = Some(dir.path().join("missing.db"));

        assert!(build_retriever(&config).is_err());
        assert!(build_phishing_handler(&config).is_err());
    }

    #[test]
    fn test_build_retriever_opens_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emails.db");
        {
            let index = SqliteEmailIndex::create(&path).unwrap();
            index
                .add_email("Verify your password now", 1, &serde_json::Map::new())
                .unwrap();
        }
        let mut config = AssistantConfig::default();
        config.retrieval.index_path = Some(path);

        let retriever = build_retriever(&config).unwrap();
        assert_eq!(retriever.retrieve("password").unwrap().len(), 1);
    }
}
