//! Hosted hybrid search index integration.

pub mod client;
pub mod filters;
pub mod types;

pub use client::{AzureSearchService, HybridSearch, SearchSettings};
pub use filters::build_search_filter;
pub use types::{
    HybridQuery, ReviewDocument, SearchError, SearchFilterArgs, VECTOR_FIELD, VECTOR_NEIGHBOURS,
};
