//! `SearxNG`-style JSON search with page fetching.

use super::{WebSearch, html_to_text};
use crate::llm::{LlmHttpConfig, build_http_client};
use crate::models::SearchResult;
use crate::structured::Schema;
use serde::Deserialize;

/// Web search over a `SearxNG` instance.
///
/// Requests `candidates` result URLs, fetches each page, and keeps pages whose
/// reduced text is non-empty until the caller's limit is reached.
pub struct SearxSearch {
    /// Search endpoint, without trailing slash.
    endpoint: String,
    /// Number of candidate URLs to consider.
    candidates: usize,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl SearxSearch {
    /// Default search endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:8080";

    /// Default number of candidate URLs.
    pub const DEFAULT_CANDIDATES: usize = 10;

    /// Creates a search client for `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            candidates: Self::DEFAULT_CANDIDATES,
            client: build_http_client(LlmHttpConfig {
                timeout_ms: 10_000,
                connect_timeout_ms: 3_000,
            }),
        }
    }

    /// Sets the number of candidate URLs.
    #[must_use]
    pub const fn with_candidates(mut self, candidates: usize) -> Self {
        self.candidates = candidates;
        self
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Returns candidate URLs for `query`, or none on any failure.
    fn search_urls(&self, query: &str) -> Vec<String> {
        let response = self
            .client
            .get(format!("{}/search", self.endpoint))
            .query(&[("q", query), ("format", "json")])
            .send();

        let body = match response {
            Ok(r) if r.status().is_success() => match r.text() {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read search response");
                    return Vec::new();
                },
            },
            Ok(r) => {
                tracing::warn!(status = %r.status(), "Search endpoint returned error status");
                return Vec::new();
            },
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "Search request failed");
                return Vec::new();
            },
        };

        parse_result_urls(&body, self.candidates)
    }

    /// Fetches `url` and reduces it to text. `None` if unreachable or empty.
    fn fetch(&self, url: &str) -> Option<SearchResult> {
        let response = match self.client.get(url).send() {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::debug!(url, status = %r.status(), "Skipping page");
                return None;
            },
            Err(e) => {
                tracing::debug!(url, error = %e, "Failed to fetch page");
                return None;
            },
        };

        let html = response.text().ok()?;
        let content = html_to_text(&html);
        if content.is_empty() {
            return None;
        }

        let value = serde_json::json!({ "url": url, "content": content });
        SearchResult::from_value(&value)
            .map_err(|e| tracing::debug!(url, error = %e, "Discarding search result"))
            .ok()
    }
}

impl WebSearch for SearxSearch {
    #[tracing::instrument(skip(self, query), fields(endpoint = %self.endpoint, limit))]
    fn search_and_fetch(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        if limit == 0 {
            return Vec::new();
        }

        let results: Vec<SearchResult> = self
            .search_urls(query)
            .iter()
            .filter_map(|url| self.fetch(url))
            .take(limit)
            .collect();

        tracing::debug!(found = results.len(), "Web search complete");
        results
    }
}

/// Search API response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// One search hit.
#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    url: String,
}

/// Pulls up to `max` non-empty, de-duplicated URLs out of a search response body.
fn parse_result_urls(body: &str, max: usize) -> Vec<String> {
    let response: SearchResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse search response");
            return Vec::new();
        },
    };

    let mut urls: Vec<String> = Vec::new();
    for hit in response.results {
        if urls.len() >= max {
            break;
        }
        let url = hit.url.trim();
        if url.is_empty() || urls.iter().any(|u| u == url) {
            continue;
        }
        urls.push(url.to_string());
    }
    urls
}
