//! Similar-email retrieval for the phishing handler.
//!
//! The retriever only supplies labeled reference emails for the prompt. A
//! retrieval failure costs the classifier some context; it never fails the
//! turn.

mod sqlite;

pub use sqlite::SqliteEmailIndex;

use crate::Result;
use crate::models::RetrievedEmail;

/// Looks up emails similar to a query.
pub trait EmailRetriever: Send + Sync {
    /// Returns reference emails ordered from most to least similar.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying index cannot be queried.
    fn retrieve(&self, query: &str) -> Result<Vec<RetrievedEmail>>;
}

/// Retriever that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetriever;

impl EmailRetriever for NoRetriever {
    fn retrieve(&self, _query: &str) -> Result<Vec<RetrievedEmail>> {
        Ok(Vec::new())
    }
}
