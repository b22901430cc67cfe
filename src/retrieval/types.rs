//! Request and record types for the retrieval pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::embedding::EmbeddingClientError;
use crate::search::{SearchError, SearchFilterArgs};

/// Errors raised while retrieving review records.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Query text was blank.
    #[error("Query must not be empty")]
    EmptyQuery,
    /// Embedding provider failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingClientError),
    /// Embedding provider answered without a vector for the query.
    #[error("Embedding provider returned no vector for the query")]
    EmptyEmbedding,
    /// Search service failed or a filter input was rejected.
    #[error(transparent)]
    Search(#[from] SearchError),
    /// A hit carried a publication timestamp in an unknown format.
    #[error("Review {id} has an unreadable publication date '{value}'")]
    InvalidTimestamp {
        /// Search document identifier.
        id: String,
        /// Raw timestamp value.
        value: String,
    },
}

/// Free-text query plus structured filters, shared by the listing and analysis paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalRequest {
    pub query: String,
    /// Inclusive lower bound on the publication date.
    pub review_date_from: Option<String>,
    pub industries: Vec<String>,
    pub company_sizes: Vec<String>,
    pub project_budgets: Vec<String>,
    /// Result count for contact listings; the analysis path uses its own fixed size.
    pub limit: Option<usize>,
}

impl RetrievalRequest {
    pub fn filter_args(&self) -> SearchFilterArgs {
        SearchFilterArgs {
            date_from: self.review_date_from.clone(),
            industries: self.industries.clone(),
            company_sizes: self.company_sizes.clone(),
            project_budgets: self.project_budgets.clone(),
        }
    }
}

/// One reviewer contact as shown in listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(rename = "Position")]
    pub position: String,
    /// Personal LinkedIn profile URL, or empty.
    #[serde(rename = "LinkedIn")]
    pub linkedin: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "Company Size")]
    pub company_size: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Project Name")]
    pub project_name: String,
    #[serde(rename = "Project Budget")]
    pub project_budget: String,
    /// `"<Month>, <Year>"` of the publication date.
    #[serde(rename = "Project Finished Date")]
    pub project_finished_date: String,
    #[serde(rename = "Project Tags")]
    pub project_tags: Vec<String>,
    #[serde(rename = "Vendor Name")]
    pub vendor_name: String,
    #[serde(rename = "Background")]
    pub background: String,
    #[serde(rename = "Solution")]
    pub solution: String,
    #[serde(rename = "Opportunity & Challenge")]
    pub opportunity_challenge: String,
    #[serde(rename = "Feedback")]
    pub feedback: String,
}

/// Raw review text handed to the summarizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub project_name: String,
    pub industry: String,
    pub background: String,
    pub challenge: String,
    pub solution: String,
    pub feedback: String,
}
