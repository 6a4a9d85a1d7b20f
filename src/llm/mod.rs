//! Text generator abstraction.
//!
//! The pipeline only needs `conversation in, text out`. Two HTTP clients are
//! provided: [`OpenAiClient`] for any OpenAI-compatible chat-completions
//! endpoint (including Ollama's `/v1` facade) and [`OllamaClient`] for
//! Ollama's native chat API.

mod ollama;
mod openai;
pub mod prompts;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::Result;
use crate::conversation::Conversation;
use std::sync::Arc;
use std::time::Duration;

/// Trait for text generators.
///
/// Calls are blocking. A failed call is reported as an error; callers in the
/// pipeline treat it the same as an empty completion.
pub trait TextGenerator: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// The model identifier, for logs.
    fn model(&self) -> &str {
        "unknown"
    }

    /// Generates the next assistant message for `conversation`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be read.
    fn generate(&self, conversation: &Conversation) -> Result<String>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    fn generate(&self, conversation: &Conversation) -> Result<String> {
        (**self).generate(conversation)
    }
}

/// HTTP client configuration for generator requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmHttpConfig {
    /// Loads HTTP configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Loads HTTP configuration from config file settings.
    #[must_use]
    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        let mut settings = Self::default();
        if let Some(timeout_ms) = config.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = config.connect_timeout_ms {
            settings.connect_timeout_ms = connect_timeout_ms;
        }
        settings
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("PHISHWISE_LLM_TIMEOUT_MS") {
            if let Ok(timeout_ms) = v.parse::<u64>() {
                self.timeout_ms = timeout_ms;
            }
        }
        if let Ok(v) = std::env::var("PHISHWISE_LLM_CONNECT_TIMEOUT_MS") {
            if let Ok(connect_timeout_ms) = v.parse::<u64>() {
                self.connect_timeout_ms = connect_timeout_ms;
            }
        }
        self
    }
}

/// Builds a blocking HTTP client with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// Classifies a transport error for structured logs.
pub(crate) fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_decode() {
        "decode"
    } else if e.is_request() {
        "request"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl TextGenerator for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn generate(&self, conversation: &Conversation) -> Result<String> {
            Ok(conversation
                .last()
                .map(|m| m.content().to_string())
                .unwrap_or_default())
        }
    }

    #[test]
    fn test_arc_forwards() {
        let generator: Arc<dyn TextGenerator> = Arc::new(Echo);
        let convo = Conversation::new().with_user_message("ping");
        assert_eq!(generator.name(), "echo");
        assert_eq!(generator.model(), "unknown");
        assert_eq!(generator.generate(&convo).unwrap(), "ping");
    }

    #[test]
    fn test_http_config_from_config() {
        let config = crate::config::LlmConfig {
            timeout_ms: Some(5_000),
            ..Default::default()
        };
        let http = LlmHttpConfig::from_config(&config);
        assert_eq!(http.timeout_ms, 5_000);
        assert_eq!(http.connect_timeout_ms, LlmHttpConfig::default().connect_timeout_ms);
    }
}
