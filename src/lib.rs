//! # Phishwise
//!
//! A chat assistant that routes free-text queries between cybersecurity
//! question answering and phishing-email classification.
//!
//! Language models are not schema-enforcing: they wrap JSON in prose, emit
//! nested objects, and put braces inside string values. Phishwise makes the
//! pipeline reliable anyway through two coupled pieces:
//!
//! - [`structured`]: brace-balanced JSON extraction plus per-schema validation
//!   with declared coercions.
//! - [`pipeline`]: intent classification, dispatch to the Q&A or phishing
//!   handler, fallback policy, and conversation commit.
//!
//! ## Example
//!
//! ```rust,ignore
//! use phishwise::{Router, Session};
//!
//! let router = Router::builder()
//!     .classifier(classifier_llm)
//!     .qa(qa_llm)
//!     .phishing(phishing_llm)
//!     .build()?;
//!
//! let mut session = Session::new();
//! let answer = router.route(&mut session, "What are common signs of phishing?");
//! assert_eq!(session.conversation().len(), 2);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod retrieval;
pub mod search;
pub mod structured;

// Re-exports for convenience
pub use config::AssistantConfig;
pub use conversation::{Conversation, Session};
pub use llm::TextGenerator;
pub use models::{
    EmailLabel, Message, Mode, ModeKind, PhishingEvaluation, RetrievedEmail, Role, SearchResult,
};
pub use pipeline::{ModeClassifier, Notice, NoticeSink, Router, RouterBuilder, TurnOutcome};
pub use retrieval::EmailRetriever;
pub use search::WebSearch;
pub use structured::{ParseError, Schema, ValidationError, extract, extract_and_validate, validate};

/// Error type for phishwise operations.
///
/// These are infrastructure failures (configuration, HTTP, `SQLite`). Parsing
/// of model output never produces this type; see [`ParseError`].
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Bad configuration values, empty queries, missing collaborators |
/// | `OperationFailed` | HTTP requests, file I/O, database queries, logger init |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for phishwise operations.
pub type Result<T> = std::result::Result<T, Error>;
