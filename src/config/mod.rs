//! Configuration management.
//!
//! Settings come from a TOML file (every field optional) and are then
//! overridden by environment variables:
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `PHISHWISE_LLM_PROVIDER` | `llm.provider` |
//! | `PHISHWISE_LLM_BASE_URL` | `llm.base_url` |
//! | `PHISHWISE_LLM_API_KEY`, `OPENAI_API_KEY` | `llm.api_key` |
//! | `PHISHWISE_CLASSIFIER_MODEL` | `models.classifier` |
//! | `PHISHWISE_QA_MODEL` | `models.qa` |
//! | `PHISHWISE_PHISHING_MODEL` | `models.phishing` |
//! | `PHISHWISE_INDEX_PATH` | `retrieval.index_path` |
//! | `PHISHWISE_SEARCH_ENDPOINT` | `search.endpoint` (and enables search) |

use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for phishwise.
#[derive(Debug, Clone, Default)]
pub struct AssistantConfig {
    /// Generator endpoint configuration.
    pub llm: LlmConfig,
    /// Model per generator role.
    pub models: ModelsConfig,
    /// Similar-email retrieval.
    pub retrieval: RetrievalConfig,
    /// Web search for the QA pipeline.
    pub search: SearchConfig,
    /// Raw logging settings, resolved by [`crate::observability`].
    pub logging: LoggingSettings,
}

/// Generator endpoint configuration.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    /// Which client talks to the endpoint.
    pub provider: LlmProvider,
    /// Base URL. Provider default when unset.
    pub base_url: Option<String>,
    /// API key. Local servers ignore it.
    pub api_key: Option<SecretString>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Available generator clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// OpenAI-compatible chat completions (also served by Ollama under `/v1`).
    #[default]
    OpenAi,
    /// Ollama's native chat API.
    Ollama,
}

impl LlmProvider {
    /// Parses a provider string. Unknown values select `OpenAi`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ollama" => Self::Ollama,
            _ => Self::OpenAi,
        }
    }

    /// Returns the provider name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

/// Model name for each generator role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelsConfig {
    /// Mode classifier model.
    pub classifier: String,
    /// Question answering model.
    pub qa: String,
    /// Phishing classifier model.
    pub phishing: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            classifier: "llama3.1".to_string(),
            qa: "llama3-chatqa".to_string(),
            phishing: "gemma-1b-finetuned".to_string(),
        }
    }
}

/// Similar-email retrieval configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Path to the `SQLite` email index. Retrieval is off when unset.
    pub index_path: Option<PathBuf>,
    /// Number of similar emails shown to the phishing classifier.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_path: None,
            top_k: crate::retrieval::SqliteEmailIndex::DEFAULT_TOP_K,
        }
    }
}

/// Web search configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Whether the QA pipeline searches the web.
    pub enabled: bool,
    /// Search endpoint.
    pub endpoint: String,
    /// Documents kept for the prompt.
    pub results: usize,
    /// Candidate URLs fetched to find them.
    pub candidates: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: crate::search::SearxSearch::DEFAULT_ENDPOINT.to_string(),
            results: 3,
            candidates: crate::search::SearxSearch::DEFAULT_CANDIDATES,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// LLM section.
    pub llm: Option<ConfigFileLlm>,
    /// Models section.
    pub models: Option<ConfigFileModels>,
    /// Retrieval section.
    pub retrieval: Option<ConfigFileRetrieval>,
    /// Search section.
    pub search: Option<ConfigFileSearch>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// Provider name.
    pub provider: Option<String>,
    /// Base URL.
    pub base_url: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Models section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileModels {
    /// Mode classifier model.
    pub classifier: Option<String>,
    /// QA model.
    pub qa: Option<String>,
    /// Phishing classifier model.
    pub phishing: Option<String>,
}

/// Retrieval section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileRetrieval {
    /// Index path.
    pub index_path: Option<String>,
    /// Similar emails per query.
    pub top_k: Option<usize>,
}

/// Search section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSearch {
    /// Enable web search.
    pub enabled: Option<bool>,
    /// Search endpoint.
    pub endpoint: Option<String>,
    /// Documents kept.
    pub results: Option<usize>,
    /// Candidate URLs.
    pub candidates: Option<usize>,
}

/// Logging section in config file.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive, e.g. `phishwise=debug`.
    pub filter: Option<String>,
    /// Log file path. Logs go to stderr when unset.
    pub file: Option<String>,
}

impl AssistantConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/phishwise/` on macOS)
    /// 2. XDG config dir (`~/.config/phishwise/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        Self::default_paths()
            .into_iter()
            .filter(|path| path.exists())
            .find_map(|path| match Self::load_from_file(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                    None
                },
            })
            .unwrap_or_default()
    }

    /// Candidate config file locations, in lookup order.
    #[must_use]
    pub fn default_paths() -> Vec<PathBuf> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Vec::new();
        };

        let platform = base_dirs.config_dir().join("phishwise").join("config.toml");
        let xdg = base_dirs
            .home_dir()
            .join(".config")
            .join("phishwise")
            .join("config.toml");
        if platform == xdg {
            vec![platform]
        } else {
            vec![platform, xdg]
        }
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("PHISHWISE_LLM_PROVIDER") {
            self.llm.provider = LlmProvider::parse(&provider);
        }
        if let Some(base_url) = get("PHISHWISE_LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }
        if let Some(key) = get("PHISHWISE_LLM_API_KEY").or_else(|| get("OPENAI_API_KEY")) {
            self.llm.api_key = Some(SecretString::from(key));
        }
        if let Some(model) = get("PHISHWISE_CLASSIFIER_MODEL") {
            self.models.classifier = model;
        }
        if let Some(model) = get("PHISHWISE_QA_MODEL") {
            self.models.qa = model;
        }
        if let Some(model) = get("PHISHWISE_PHISHING_MODEL") {
            self.models.phishing = model;
        }
        if let Some(path) = get("PHISHWISE_INDEX_PATH") {
            self.retrieval.index_path = Some(PathBuf::from(path));
        }
        if let Some(endpoint) = get("PHISHWISE_SEARCH_ENDPOINT") {
            self.search.endpoint = endpoint;
            self.search.enabled = true;
        }
    }

    /// Converts a `ConfigFile` to `AssistantConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                config.llm.provider = LlmProvider::parse(&provider);
            }
            config.llm.base_url = llm.base_url;
            config.llm.api_key = llm.api_key.map(SecretString::from);
            config.llm.timeout_ms = llm.timeout_ms;
            config.llm.connect_timeout_ms = llm.connect_timeout_ms;
        }
        if let Some(models) = file.models {
            if let Some(v) = models.classifier {
                config.models.classifier = v;
            }
            if let Some(v) = models.qa {
                config.models.qa = v;
            }
            if let Some(v) = models.phishing {
                config.models.phishing = v;
            }
        }
        if let Some(retrieval) = file.retrieval {
            config.retrieval.index_path = retrieval.index_path.map(PathBuf::from);
            if let Some(v) = retrieval.top_k {
                config.retrieval.top_k = v;
            }
        }
        if let Some(search) = file.search {
            if let Some(v) = search.enabled {
                config.search.enabled = v;
            }
            if let Some(v) = search.endpoint {
                config.search.endpoint = v;
            }
            if let Some(v) = search.results {
                config.search.results = v;
            }
            if let Some(v) = search.candidates {
                config.search.candidates = v;
            }
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }
}
