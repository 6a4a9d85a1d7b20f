//! Web search context for the Q&A handler.
//!
//! Search is optional context. Implementations never fail a turn: any
//! transport or parsing problem degrades to fewer results, and zero results
//! means the answer is generated from general knowledge.

mod html;
mod searx;

pub use html::html_to_text;
pub use searx::SearxSearch;

use crate::models::SearchResult;

/// Searches the web and fetches page contents.
pub trait WebSearch: Send + Sync {
    /// Returns up to `limit` fetched pages relevant to `query`.
    fn search_and_fetch(&self, query: &str, limit: usize) -> Vec<SearchResult>;
}

/// Search backend used when web search is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWebSearch;

impl WebSearch for NoWebSearch {
    fn search_and_fetch(&self, _query: &str, _limit: usize) -> Vec<SearchResult> {
        Vec::new()
    }
}
