//! Mode-routing pipeline.
//!
//! ```text
//! query ──► ModeClassifier ──► Mode ──► qa ─────────────────► QaHandler
//!                │                 └──► phishing_detection ──► PhishingHandler
//!                └─ failure ──► Mode::defaulted() (qa)
//! ```
//!
//! Mode classification failure forces QA. Phishing classification failure
//! produces a fixed failure reply and never falls back to QA.

mod classifier;
mod notice;
mod phishing;
mod qa;
mod router;

pub use classifier::ModeClassifier;
pub use notice::{Notice, NoticeSink, SilentSink};
pub use phishing::{PHISHING_FAILURE_RESPONSE, PhishingHandler};
pub use qa::{QA_FAILURE_RESPONSE, QaHandler};
pub use router::{Router, RouterBuilder, TurnOutcome};
