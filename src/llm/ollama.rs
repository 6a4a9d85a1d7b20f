//! Ollama (local) client using the native chat API.

use super::{LlmHttpConfig, TextGenerator, build_http_client, error_kind};
use crate::conversation::Conversation;
use crate::models::Message;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ollama local LLM client.
pub struct OllamaClient {
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:11434";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "llama3.1";

    /// Creates a new Ollama client.
    #[must_use]
    pub fn new() -> Self {
        let endpoint =
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string());

        Self {
            endpoint,
            model: Self::DEFAULT_MODEL.to_string(),
            client: build_http_client(LlmHttpConfig::from_env()),
        }
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Checks if Ollama is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.endpoint))
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Makes a chat request to the Ollama API.
    fn chat(&self, messages: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.endpoint))
            .json(&request)
            .send()
            .map_err(|e| {
                let kind = error_kind(&e);
                tracing::error!(
                    provider = "ollama",
                    model = %self.model,
                    error = %e,
                    error_kind = kind,
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    "LLM chat request failed"
                );
                Error::OperationFailed {
                    operation: "ollama_chat".to_string(),
                    cause: format!("{kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "ollama",
                model = %self.model,
                status = %status,
                body = %body,
                "LLM chat API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "ollama_chat".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: ChatResponse = response.json().map_err(|e| {
            tracing::error!(
                provider = "ollama",
                model = %self.model,
                error = %e,
                "Failed to parse LLM chat response"
            );
            Error::OperationFailed {
                operation: "ollama_chat_response".to_string(),
                cause: e.to_string(),
            }
        })?;

        Ok(response.message.content)
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[tracing::instrument(
        skip(self, conversation),
        fields(provider = "ollama", model = %self.model, messages = conversation.len())
    )]
    fn generate(&self, conversation: &Conversation) -> Result<String> {
        self.chat(conversation.history())
    }
}

/// Request to the Chat API.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// Response from the Chat API.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

/// Assistant message in a chat response.
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}
