//! OpenAI-compatible chat-completions client.
//!
//! Works against `OpenAI` itself and against local servers that expose the
//! same API (Ollama's `/v1`, vLLM, `DeepInfra`). The API key is optional
//! because local servers ignore it.

use super::{LlmHttpConfig, TextGenerator, build_http_client, error_kind};
use crate::conversation::Conversation;
use crate::models::Message;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat client.
pub struct OpenAiClient {
    /// API key.
    api_key: Option<SecretString>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// Sampling temperature.
    temperature: Option<f32>,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Default API endpoint (Ollama's OpenAI-compatible facade).
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:11434/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "llama3.1";

    /// Creates a new client, reading `OPENAI_API_KEY` if set.
    #[must_use]
    pub fn new() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").ok().map(SecretString::from);
        Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            temperature: None,
            client: build_http_client(LlmHttpConfig::from_env()),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
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

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Makes a request to the chat completions API.
    fn request(&self, messages: &[Message]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream: false,
            temperature: self.temperature,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().map_err(|e| {
            let kind = error_kind(&e);
            tracing::error!(
                provider = "openai",
                model = %self.model,
                error = %e,
                error_kind = kind,
                "Chat completion request failed"
            );
            Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: format!("{kind} error: {e}"),
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "openai",
                model = %self.model,
                status = %status,
                body = %body,
                "Chat completion API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: ChatCompletionResponse =
            response.json().map_err(|e| Error::OperationFailed {
                operation: "openai_response".to_string(),
                cause: e.to_string(),
            })?;

        first_choice_content(response)
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[tracing::instrument(
        skip(self, conversation),
        fields(provider = "openai", model = %self.model, messages = conversation.len())
    )]
    fn generate(&self, conversation: &Conversation) -> Result<String> {
        self.request(conversation.history())
    }
}

/// Pulls the text out of the first choice. A `null` content is an empty completion.
fn first_choice_content(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| Error::OperationFailed {
            operation: "openai_response".to_string(),
            cause: "No choices in response".to_string(),
        })
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

/// Assistant message inside a choice.
#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_configuration() {
        let client = OpenAiClient::new()
            .with_api_key("test-key")
            .with_endpoint("https://api.deepinfra.com/v1/openai/")
            .with_model("meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo")
            .with_temperature(0.0);

        assert_eq!(client.name(), "openai");
        assert_eq!(client.endpoint, "https://api.deepinfra.com/v1/openai");
        assert_eq!(client.model(), "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo");
        assert_eq!(
            client.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("test-key".to_string())
        );
        assert_eq!(client.temperature, Some(0.0));
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![Message::system("sys"), Message::user("hi")];
        let request = ChatCompletionRequest {
            model: "llama3.1",
            messages: &messages,
            stream: false,
            temperature: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_first_choice_content() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"mode\":\"qa\"}"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(response).unwrap(), r#"{"mode":"qa"}"#);

        let null_content: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert_eq!(first_choice_content(null_content).unwrap(), "");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_choice_content(empty).is_err());
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let client = OpenAiClient::new()
            .with_endpoint("http://127.0.0.1:9")
            .with_http_config(LlmHttpConfig {
                timeout_ms: 500,
                connect_timeout_ms: 200,
            });
        let convo = Conversation::new().with_user_message("hi");
        assert!(client.generate(&convo).is_err());
    }
}
