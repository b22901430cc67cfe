//! Core library for reviewscope: filter-and-rank search over scraped vendor reviews.

/// User records, token budgets, and the request log.
pub mod accounts;
/// Map-reduce narrative summarization.
pub mod analysis;
/// HTTP routing and REST handlers.
pub mod api;
/// Bearer-token parsing and identity-provider exchange.
pub mod auth;
/// Chat-completion client abstraction and adapters.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Question/answer extraction from review text.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Request metrics helpers.
pub mod metrics;
/// Company profiles, the two-stage filter engine, and aggregates.
pub mod profiles;
/// Hybrid retrieval pipeline producing contact and analysis records.
pub mod retrieval;
/// Hybrid search service integration.
pub mod search;
/// Request orchestration behind every inbound surface.
pub mod service;
