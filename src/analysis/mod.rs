//! Narrative analysis of retrieved reviews.

pub mod partition;
pub mod prompts;
pub mod summarizer;

pub use partition::partition;
pub use summarizer::{AnalysisError, DIGEST_CHUNKS, Summarizer};
