//! Generator client factory functions.
//!
//! One endpoint configuration serves all three roles; only the model differs.

use std::sync::Arc;

use crate::config::{LlmConfig, LlmProvider};
use crate::llm::{LlmHttpConfig, OllamaClient, OpenAiClient, TextGenerator};
use secrecy::ExposeSecret;

/// Builds HTTP configuration from LLM config with environment overrides.
#[must_use]
pub fn build_http_config(llm_config: &LlmConfig) -> LlmHttpConfig {
    LlmHttpConfig::from_config(llm_config).with_env_overrides()
}

/// Builds an `OpenAI`-compatible client for `model`.
#[must_use]
pub fn build_openai_client(llm_config: &LlmConfig, model: &str) -> OpenAiClient {
    let mut client = OpenAiClient::new().with_model(model);
    if let Some(ref api_key) = llm_config.api_key {
        client = client.with_api_key(api_key.expose_secret());
    }
    if let Some(ref base_url) = llm_config.base_url {
        client = client.with_endpoint(base_url);
    }
    client.with_http_config(build_http_config(llm_config))
}

/// Builds an Ollama client for `model`.
#[must_use]
pub fn build_ollama_client(llm_config: &LlmConfig, model: &str) -> OllamaClient {
    let mut client = OllamaClient::new().with_model(model);
    if let Some(ref base_url) = llm_config.base_url {
        client = client.with_endpoint(base_url);
    }
    client.with_http_config(build_http_config(llm_config))
}

/// Builds the configured generator for `model`.
#[must_use]
pub fn build_generator(llm_config: &LlmConfig, model: &str) -> Arc<dyn TextGenerator> {
    tracing::debug!(provider = llm_config.provider.as_str(), model, "Building generator");
    match llm_config.provider {
        LlmProvider::OpenAi => Arc::new(build_openai_client(llm_config, model)),
        LlmProvider::Ollama => Arc::new(build_ollama_client(llm_config, model)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_build_http_config_with_defaults() {
        let http_config = build_http_config(&LlmConfig::default());
        assert!(http_config.connect_timeout_ms > 0);
        assert!(http_config.timeout_ms > 0);
    }

    #[test]
    fn test_build_openai_client_with_config() {
        let llm_config = LlmConfig {
            api_key: Some(SecretString::from("test-api-key".to_string())),
            base_url: Some("https://api.deepinfra.com/v1/openai".to_string()),
            ..Default::default()
        };

        let client = build_openai_client(&llm_config, "llama3-chatqa");
        assert_eq!(client.name(), "openai");
        assert_eq!(client.model(), "llama3-chatqa");
    }

    #[test]
    fn test_build_generator_by_provider() {
        let ollama = LlmConfig {
            provider: LlmProvider::Ollama,
            ..Default::default()
        };
        let generator = build_generator(&ollama, "gemma-1b-finetuned");
        assert_eq!(generator.name(), "ollama");
        assert_eq!(generator.model(), "gemma-1b-finetuned");

        let generator = build_generator(&LlmConfig::default(), "llama3.1");
        assert_eq!(generator.name(), "openai");
    }
}
