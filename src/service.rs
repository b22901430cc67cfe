//! Request orchestration shared by every inbound surface.
//!
//! Paid actions run in a fixed order: resolve the caller, check the budget, do the work, then
//! record usage and log the request. A failure at any step ends the request; usage is only
//! recorded after the work succeeded.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::accounts::{
    AccountError, Action, MemoryUserStore, RequestLogEntry, User, UserStore,
    ensure_authorised_access,
};
use crate::analysis::{AnalysisError, Summarizer};
use crate::auth::{AuthError, IdentityProvider, UserInfoIdentityProvider, bearer_token};
use crate::completion::{CompletionClientError, OpenAiCompletionClient};
use crate::config::Config;
use crate::embedding::{EmbeddingClientError, EmbeddingSettings, HttpEmbeddingClient};
use crate::metrics::{MetricsSnapshot, RequestMetrics};
use crate::profiles::{
    CompanyProfile, MemoryProfileStore, ProfileAggregates, ProfileCriteria, ProfileStore,
    RANKED_PROFILE_LIMIT, StoreError, aggregate, filter_profiles, filter_profiles_ranked,
};
use crate::retrieval::{ContactRecord, RetrievalError, RetrievalRequest, RetrievalService};
use crate::search::{AzureSearchService, SearchError, SearchSettings};

/// Caller-facing classification of every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    UpstreamFailure,
    BadInput,
}

/// Errors surfaced by [`ReviewApi`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingClientError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Completion(#[from] CompletionClientError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Auth(AuthError::Unavailable(_)) => ErrorKind::UpstreamFailure,
            ServiceError::Auth(_) => ErrorKind::Unauthorized,
            ServiceError::Account(error) => match error {
                AccountError::Unauthorized
                | AccountError::NoPlan
                | AccountError::AllowanceExceeded(_) => ErrorKind::Unauthorized,
                AccountError::NotFound => ErrorKind::NotFound,
                AccountError::InvalidAction(_) => ErrorKind::BadInput,
                AccountError::Store(_) => ErrorKind::UpstreamFailure,
            },
            ServiceError::Retrieval(RetrievalError::EmptyQuery)
            | ServiceError::Retrieval(RetrievalError::Search(SearchError::InvalidFilter(_)))
            | ServiceError::Search(SearchError::InvalidFilter(_)) => ErrorKind::BadInput,
            ServiceError::Retrieval(_)
            | ServiceError::Analysis(_)
            | ServiceError::Store(_)
            | ServiceError::Embedding(_)
            | ServiceError::Search(_)
            | ServiceError::Completion(_) => ErrorKind::UpstreamFailure,
        }
    }
}

/// Filtered profiles plus grouped review counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSearchResult {
    pub profiles: Vec<CompanyProfile>,
    pub aggregates: ProfileAggregates,
}

/// Result sizes requested from the search service.
#[derive(Debug, Clone, Copy)]
pub struct ServiceLimits {
    /// Contact listing size when the request names none.
    pub search_default_limit: usize,
    /// Hits fed into every analysis.
    pub analyze_limit: usize,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            search_default_limit: 500,
            analyze_limit: 25,
        }
    }
}

/// Operations exposed to the HTTP layer.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Resolve an `Authorization` header value to the caller's email.
    async fn authenticate(&self, authorization: Option<&str>) -> Result<String, ServiceError>;

    /// Budgeted contact listing.
    async fn search(
        &self,
        email: &str,
        request: RetrievalRequest,
    ) -> Result<Vec<ContactRecord>, ServiceError>;

    /// Budgeted narrative analysis.
    async fn analyze(&self, email: &str, request: RetrievalRequest)
    -> Result<String, ServiceError>;

    /// Create the caller's account if missing and return it.
    async fn register(&self, email: &str) -> Result<User, ServiceError>;

    /// Current budgets for the caller.
    async fn usage(&self, email: &str) -> Result<User, ServiceError>;

    /// Filter stored profiles; `ranked` selects the relevance-ordered, capped variant.
    async fn search_profiles(
        &self,
        criteria: ProfileCriteria,
        ranked: bool,
    ) -> Result<ProfileSearchResult, ServiceError>;

    /// Insert profiles not yet stored; returns how many were inserted.
    async fn import_profiles(&self, profiles: Vec<CompanyProfile>) -> Result<usize, ServiceError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Production [`ReviewApi`] wiring stores, clients, and pipelines together.
pub struct ReviewService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
    profiles: Arc<dyn ProfileStore>,
    retrieval: RetrievalService,
    summarizer: Summarizer,
    limits: ServiceLimits,
    metrics: Arc<RequestMetrics>,
}

impl ReviewService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserStore>,
        profiles: Arc<dyn ProfileStore>,
        retrieval: RetrievalService,
        summarizer: Summarizer,
        limits: ServiceLimits,
    ) -> Self {
        Self {
            identity,
            users,
            profiles,
            retrieval,
            summarizer,
            limits,
            metrics: Arc::new(RequestMetrics::new()),
        }
    }

    /// Build HTTP-backed clients and in-memory stores from configuration, seeding profiles from
    /// `PROFILES_PATH` when set.
    pub async fn from_config(config: &Config) -> Result<Self, ServiceError> {
        tracing::info!("Initializing embedding and search clients");
        let embeddings = HttpEmbeddingClient::new(EmbeddingSettings::from_config(config))?;
        let search = AzureSearchService::new(SearchSettings::from_config(config))?;
        let completion = OpenAiCompletionClient::from_config(config)?;
        let identity = UserInfoIdentityProvider::new(config.identity_userinfo_url.clone())?;

        let profiles = match &config.profiles_path {
            Some(path) => MemoryProfileStore::load_json(path).await?,
            None => {
                tracing::warn!("PROFILES_PATH not set; profile store starts empty");
                MemoryProfileStore::new()
            }
        };

        Ok(Self::new(
            Arc::new(identity),
            Arc::new(MemoryUserStore::new()),
            Arc::new(profiles),
            RetrievalService::new(Arc::new(embeddings), Arc::new(search)),
            Summarizer::new(Arc::new(completion)),
            ServiceLimits {
                search_default_limit: config.search_default_limit,
                analyze_limit: config.analyze_limit,
            },
        ))
    }

    async fn record_usage(
        &self,
        email: &str,
        action: Action,
        request: &RetrievalRequest,
    ) -> Result<(), ServiceError> {
        self.users.increment_usage(email, action, 1).await?;
        self.users
            .log_request(RequestLogEntry::new(
                email,
                action,
                request_log_body(email, action, request),
            ))
            .await?;
        Ok(())
    }
}

/// Request body as stored in the request log; `null` with a warning when it cannot be encoded.
fn request_log_body<T: Serialize>(email: &str, action: Action, request: &T) -> serde_json::Value {
    serde_json::to_value(request).unwrap_or_else(|error| {
        tracing::warn!(email, %action, %error, "Request body not serializable for the request log");
        serde_json::Value::Null
    })
}

#[async_trait]
impl ReviewApi for ReviewService {
    async fn authenticate(&self, authorization: Option<&str>) -> Result<String, ServiceError> {
        let token = bearer_token(authorization)?;
        Ok(self.identity.email_for_token(token).await?)
    }

    async fn search(
        &self,
        email: &str,
        request: RetrievalRequest,
    ) -> Result<Vec<ContactRecord>, ServiceError> {
        ensure_authorised_access(self.users.as_ref(), email, "search").await?;
        let contacts = self
            .retrieval
            .contacts(&request, self.limits.search_default_limit)
            .await?;
        self.record_usage(email, Action::Search, &request).await?;
        self.metrics.record_search(contacts.len() as u64);
        tracing::info!(email, records = contacts.len(), "Search request completed");
        Ok(contacts)
    }

    async fn analyze(
        &self,
        email: &str,
        request: RetrievalRequest,
    ) -> Result<String, ServiceError> {
        ensure_authorised_access(self.users.as_ref(), email, "analyze").await?;
        let records = self
            .retrieval
            .analysis_inputs(&request, self.limits.analyze_limit)
            .await?;
        let narrative = self.summarizer.summarize(&request.query, &records).await?;
        self.record_usage(email, Action::Analyze, &request).await?;
        self.metrics.record_analysis();
        tracing::info!(email, records = records.len(), "Analyze request completed");
        Ok(narrative)
    }

    async fn register(&self, email: &str) -> Result<User, ServiceError> {
        Ok(self.users.create_user(email).await?)
    }

    async fn usage(&self, email: &str) -> Result<User, ServiceError> {
        Ok(self
            .users
            .get_user(email)
            .await?
            .ok_or(AccountError::NotFound)?)
    }

    async fn search_profiles(
        &self,
        criteria: ProfileCriteria,
        ranked: bool,
    ) -> Result<ProfileSearchResult, ServiceError> {
        let profiles = if ranked {
            filter_profiles_ranked(self.profiles.as_ref(), &criteria, RANKED_PROFILE_LIMIT).await?
        } else {
            filter_profiles(self.profiles.as_ref(), &criteria).await?
        };
        let aggregates = aggregate(&profiles);
        self.metrics.record_profile_query();
        tracing::info!(
            ranked,
            companies = aggregates.company_count,
            reviews = aggregates.reviews_count,
            "Profile search completed"
        );
        Ok(ProfileSearchResult {
            profiles,
            aggregates,
        })
    }

    async fn import_profiles(&self, profiles: Vec<CompanyProfile>) -> Result<usize, ServiceError> {
        let submitted = profiles.len();
        let inserted = self.profiles.insert_profiles(profiles).await?;
        tracing::info!(submitted, inserted, "Profile import completed");
        Ok(inserted)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
