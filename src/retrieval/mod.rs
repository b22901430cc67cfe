//! Hybrid retrieval pipeline: query embedding, attribute filter, one hybrid search call, and
//! projection into contact listings or summarizer input.

pub mod format;
pub mod service;
pub mod types;

pub use format::{format_position, linkedin_profile_url, month_year};
pub use service::{ANALYSIS_FIELDS, CONTACT_FIELDS, RetrievalService};
pub use types::{AnalysisRecord, ContactRecord, RetrievalError, RetrievalRequest};
