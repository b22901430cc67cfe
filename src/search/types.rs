//! Shared types used by the search client and filter builder.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Nearest neighbours requested from the vector index on every hybrid query.
pub const VECTOR_NEIGHBOURS: usize = 50;

/// Index field holding the review embedding.
pub const VECTOR_FIELD: &str = "embeddings";

/// Errors returned while interacting with the search service.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid search endpoint: {0}")]
    InvalidUrl(String),
    /// A filter input could not be expressed safely.
    #[error("Invalid search filter: {0}")]
    InvalidFilter(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Search service responded with an unexpected status code.
    #[error("Unexpected search response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Attribute constraints for a hybrid query. Empty inputs impose no constraint.
#[derive(Debug, Default, Clone)]
pub struct SearchFilterArgs {
    /// Inclusive lower bound on `date_published` (RFC 3339 or `YYYY-MM-DD`).
    pub date_from: Option<String>,
    /// Accepted `reviewer_industry` values.
    pub industries: Vec<String>,
    /// Accepted `reviewer_size_label` values.
    pub company_sizes: Vec<String>,
    /// Accepted `project_budget_label` values.
    pub project_budgets: Vec<String>,
}

/// One combined lexical/semantic + vector query.
#[derive(Debug, Clone)]
pub struct HybridQuery {
    pub text: String,
    pub vector: Vec<f32>,
    /// OData filter expression, if any.
    pub filter: Option<String>,
    /// Fields to return for each hit.
    pub select: Vec<&'static str>,
    pub top: usize,
}

/// Flattened review document as stored in the search index.
///
/// Only fields named in the query's `select` list are populated; everything else defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReviewDocument {
    pub id: String,
    pub company_name: Option<String>,
    pub date_published: Option<String>,
    pub tags: Option<Vec<String>>,
    pub project_name: Option<String>,
    pub project_budget_label: Option<String>,
    pub reviewer_industry: Option<String>,
    pub reviewer_size_label: Option<String>,
    pub reviewer_location: Option<String>,
    pub reviewer_linkedin_url: Option<String>,
    pub reviewer_position: Option<String>,
    pub content_background: Option<String>,
    pub content_opportunity_challenge: Option<String>,
    pub content_solution: Option<String>,
    pub content_results_feedback: Option<String>,
    #[serde(rename = "@search.score")]
    pub score: Option<f64>,
    #[serde(rename = "@search.rerankerScore")]
    pub reranker_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub value: Vec<ReviewDocument>,
}
