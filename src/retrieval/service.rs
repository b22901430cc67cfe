//! Embed, filter, search, and project review hits.

use std::sync::Arc;

use crate::embedding::EmbeddingClient;
use crate::extraction::questions;
use crate::search::{HybridQuery, HybridSearch, ReviewDocument, build_search_filter};

use super::format::{format_position, linkedin_profile_url, lowercase_tags, month_year};
use super::types::{AnalysisRecord, ContactRecord, RetrievalError, RetrievalRequest};

/// Fields fetched for contact listings.
pub const CONTACT_FIELDS: &[&str] = &[
    "id",
    "company_name",
    "date_published",
    "tags",
    "project_name",
    "project_budget_label",
    "reviewer_industry",
    "reviewer_size_label",
    "reviewer_location",
    "reviewer_linkedin_url",
    "content_background",
    "content_opportunity_challenge",
    "content_solution",
    "content_results_feedback",
    "reviewer_position",
];

/// Fields fetched as summarizer input.
pub const ANALYSIS_FIELDS: &[&str] = &[
    "project_name",
    "reviewer_industry",
    "content_background",
    "content_opportunity_challenge",
    "content_solution",
    "content_results_feedback",
];

/// Hybrid retrieval over the review index. Any embedding or search failure fails the call.
#[derive(Clone)]
pub struct RetrievalService {
    embeddings: Arc<dyn EmbeddingClient>,
    search: Arc<dyn HybridSearch>,
}

impl RetrievalService {
    pub fn new(embeddings: Arc<dyn EmbeddingClient>, search: Arc<dyn HybridSearch>) -> Self {
        Self { embeddings, search }
    }

    /// Run one hybrid query and return the raw hits in service rank order.
    pub async fn retrieve(
        &self,
        request: &RetrievalRequest,
        select: &[&'static str],
        top: usize,
    ) -> Result<Vec<ReviewDocument>, RetrievalError> {
        let text = request.query.trim();
        if text.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }

        let filter = build_search_filter(&request.filter_args())?;
        let vector = self
            .embeddings
            .generate_embeddings(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty())
            .ok_or(RetrievalError::EmptyEmbedding)?;

        let hits = self
            .search
            .search(&HybridQuery {
                text: text.to_string(),
                vector,
                filter,
                select: select.to_vec(),
                top,
            })
            .await?;

        tracing::debug!(hits = hits.len(), top, "Retrieved review documents");
        Ok(hits)
    }

    /// Contact listing: `request.limit` results (or `default_limit`), formatted for display.
    pub async fn contacts(
        &self,
        request: &RetrievalRequest,
        default_limit: usize,
    ) -> Result<Vec<ContactRecord>, RetrievalError> {
        let top = request.limit.unwrap_or(default_limit);
        self.retrieve(request, CONTACT_FIELDS, top)
            .await?
            .into_iter()
            .map(to_contact)
            .collect()
    }

    /// Raw text of the top `top` hits, for summarization.
    pub async fn analysis_inputs(
        &self,
        request: &RetrievalRequest,
        top: usize,
    ) -> Result<Vec<AnalysisRecord>, RetrievalError> {
        Ok(self
            .retrieve(request, ANALYSIS_FIELDS, top)
            .await?
            .into_iter()
            .map(to_analysis)
            .collect())
    }
}

fn to_contact(hit: ReviewDocument) -> Result<ContactRecord, RetrievalError> {
    let project_finished_date = match hit.date_published.as_deref() {
        Some(raw) => month_year(raw).ok_or_else(|| RetrievalError::InvalidTimestamp {
            id: hit.id.clone(),
            value: raw.to_string(),
        })?,
        None => String::new(),
    };

    Ok(ContactRecord {
        position: format_position(hit.reviewer_position.as_deref().unwrap_or_default()),
        linkedin: linkedin_profile_url(hit.reviewer_linkedin_url.as_deref()),
        industry: hit.reviewer_industry.unwrap_or_default(),
        company_size: hit.reviewer_size_label.unwrap_or_default(),
        location: hit.reviewer_location.unwrap_or_default(),
        project_name: hit.project_name.unwrap_or_default(),
        project_budget: hit.project_budget_label.unwrap_or_default(),
        project_finished_date,
        project_tags: lowercase_tags(hit.tags.as_deref().unwrap_or_default()),
        vendor_name: hit.company_name.unwrap_or_default(),
        background: questions::background()
            .extract(hit.content_background.as_deref().unwrap_or_default()),
        solution: questions::solution()
            .extract(hit.content_solution.as_deref().unwrap_or_default()),
        opportunity_challenge: questions::challenge()
            .extract(hit.content_opportunity_challenge.as_deref().unwrap_or_default()),
        feedback: questions::feedback()
            .extract(hit.content_results_feedback.as_deref().unwrap_or_default()),
    })
}

fn to_analysis(hit: ReviewDocument) -> AnalysisRecord {
    AnalysisRecord {
        project_name: hit.project_name.unwrap_or_default(),
        industry: hit.reviewer_industry.unwrap_or_default(),
        background: hit.content_background.unwrap_or_default(),
        challenge: hit.content_opportunity_challenge.unwrap_or_default(),
        solution: hit.content_solution.unwrap_or_default(),
        feedback: hit.content_results_feedback.unwrap_or_default(),
    }
}
