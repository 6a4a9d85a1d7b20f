//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;

/// Default filter directive.
const DEFAULT_FILTER: &str = "phishwise=info,warn";

/// Filter directive used with `--verbose`.
const VERBOSE_FILTER: &str = "phishwise=debug,info";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format string. Unknown values select `Pretty`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive.
    pub filter: String,
    /// Log file. Stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_FILTER.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Resolves settings with environment overrides.
    ///
    /// Precedence for the filter: `PHISHWISE_LOG`, then `RUST_LOG`, then the
    /// verbose flag, then the config file, then the default.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::resolve(settings, verbose, |key| std::env::var(key).ok())
    }

    /// Resolves settings using `lookup` for environment variables.
    #[must_use]
    pub fn resolve(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Self::default();

        if let Some(settings) = settings {
            if let Some(ref format) = settings.format {
                config.format = LogFormat::parse(format);
            }
            if let Some(ref filter) = settings.filter {
                config.filter.clone_from(filter);
            }
            config.file = settings.file.as_ref().map(PathBuf::from);
        }

        if verbose {
            config.filter = VERBOSE_FILTER.to_string();
        }
        if let Some(filter) = lookup("PHISHWISE_LOG").or_else(|| lookup("RUST_LOG")) {
            config.filter = filter;
        }
        if let Some(format) = lookup("PHISHWISE_LOG_FORMAT") {
            config.format = LogFormat::parse(&format);
        }
        if let Some(file) = lookup("PHISHWISE_LOG_FILE") {
            config.file = Some(PathBuf::from(file));
        }

        config
    }
}
