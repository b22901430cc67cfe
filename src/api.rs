//! HTTP surface for reviewscope.
//!
//! - `POST /api/search` – Budgeted hybrid search returning contact records under `response`.
//! - `POST /api/analyze` – Budgeted map-reduce analysis returning a narrative under `response`.
//! - `POST /api/user/register` – Create the caller's account (idempotent).
//! - `GET /api/user/usage` – Current token budgets for the caller.
//! - `POST /api/profiles/search` – Two-stage profile filter plus aggregates; `?ranked=true`
//!   switches to the relevance-ordered, capped variant.
//! - `POST /api/profiles/import` – Insert profiles, skipping URLs already stored.
//! - `GET /metrics` – Request counters.
//!
//! Routes marked budgeted and the user routes require `Authorization: Bearer <token>`.

use crate::accounts::User;
use crate::profiles::{CompanyProfile, ProfileCriteria};
use crate::retrieval::{ContactRecord, RetrievalRequest};
use crate::service::{ErrorKind, ProfileSearchResult, ReviewApi, ServiceError};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Build the HTTP router exposing the review API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: ReviewApi + 'static,
{
    Router::new()
        .route("/api/search", post(search::<S>))
        .route("/api/analyze", post(analyze::<S>))
        .route("/api/user/register", post(register::<S>))
        .route("/api/user/usage", get(usage::<S>))
        .route("/api/profiles/search", post(search_profiles::<S>))
        .route("/api/profiles/import", post(import_profiles::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Envelope shared by the authenticated endpoints.
#[derive(Serialize)]
struct ApiResponse<T> {
    response: T,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ProfileSearchParams {
    ranked: bool,
}

#[derive(Serialize)]
struct ImportResponse {
    inserted: usize,
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

async fn search<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
    Json(request): Json<RetrievalRequest>,
) -> Result<Json<ApiResponse<Vec<ContactRecord>>>, AppError>
where
    S: ReviewApi,
{
    let email = service.authenticate(authorization(&headers)).await?;
    let response = service.search(&email, request).await?;
    Ok(Json(ApiResponse { response }))
}

async fn analyze<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
    Json(request): Json<RetrievalRequest>,
) -> Result<Json<ApiResponse<String>>, AppError>
where
    S: ReviewApi,
{
    let email = service.authenticate(authorization(&headers)).await?;
    let response = service.analyze(&email, request).await?;
    Ok(Json(ApiResponse { response }))
}

async fn register<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<User>>, AppError>
where
    S: ReviewApi,
{
    let email = service.authenticate(authorization(&headers)).await?;
    let response = service.register(&email).await?;
    Ok(Json(ApiResponse { response }))
}

async fn usage<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<User>>, AppError>
where
    S: ReviewApi,
{
    let email = service.authenticate(authorization(&headers)).await?;
    let response = service.usage(&email).await?;
    Ok(Json(ApiResponse { response }))
}

async fn search_profiles<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<ProfileSearchParams>,
    Json(criteria): Json<ProfileCriteria>,
) -> Result<Json<ProfileSearchResult>, AppError>
where
    S: ReviewApi,
{
    Ok(Json(service.search_profiles(criteria, params.ranked).await?))
}

async fn import_profiles<S>(
    State(service): State<Arc<S>>,
    Json(profiles): Json<Vec<CompanyProfile>>,
) -> Result<Json<ImportResponse>, AppError>
where
    S: ReviewApi,
{
    let inserted = service.import_profiles(profiles).await?;
    Ok(Json(ImportResponse { inserted }))
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> impl IntoResponse
where
    S: ReviewApi,
{
    Json(service.metrics_snapshot())
}

struct AppError(ServiceError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadInput => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamFailure => {
                tracing::error!(error = %self.0, "Upstream failure while serving request");
                StatusCode::BAD_GATEWAY
            }
        };
        (status, self.0.to_string()).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(inner: ServiceError) -> Self {
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::accounts::{AccountError, Action, User};
    use crate::analysis::AnalysisError;
    use crate::auth::AuthError;
    use crate::completion::CompletionClientError;
    use crate::metrics::MetricsSnapshot;
    use crate::profiles::{CompanyProfile, ProfileAggregates, ProfileCriteria};
    use crate::retrieval::{ContactRecord, RetrievalRequest};
    use crate::service::{ProfileSearchResult, ReviewApi, ServiceError};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Search(String, RetrievalRequest),
        Analyze(String),
        Profiles(ProfileCriteria, bool),
        Import(usize),
    }

    /// Accepts the token `good` for `ann@example.com`; `spent@example.com` has no budget left.
    #[derive(Clone, Default)]
    struct StubReviewService {
        calls: Arc<Mutex<Vec<Call>>>,
        failing_analysis: bool,
    }

    impl StubReviewService {
        async fn recorded_calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl ReviewApi for StubReviewService {
        async fn authenticate(&self, authorization: Option<&str>) -> Result<String, ServiceError> {
            match authorization {
                Some("Bearer good") => Ok("ann@example.com".into()),
                Some("Bearer spent") => Ok("spent@example.com".into()),
                Some(_) => Err(AuthError::InvalidToken.into()),
                None => Err(AuthError::MissingToken.into()),
            }
        }

        async fn search(
            &self,
            email: &str,
            request: RetrievalRequest,
        ) -> Result<Vec<ContactRecord>, ServiceError> {
            if email == "spent@example.com" {
                return Err(AccountError::AllowanceExceeded(Action::Search).into());
            }
            self.calls
                .lock()
                .await
                .push(Call::Search(email.to_string(), request));
            Ok(vec![ContactRecord {
                position: "CEO".into(),
                project_tags: vec!["mobile".into()],
                ..Default::default()
            }])
        }

        async fn analyze(
            &self,
            email: &str,
            _request: RetrievalRequest,
        ) -> Result<String, ServiceError> {
            if self.failing_analysis {
                return Err(AnalysisError::Synthesis(CompletionClientError::ProviderUnavailable(
                    "down".into(),
                ))
                .into());
            }
            self.calls
                .lock()
                .await
                .push(Call::Analyze(email.to_string()));
            Ok("Vendors were praised for speed.".into())
        }

        async fn register(&self, email: &str) -> Result<User, ServiceError> {
            Ok(User::new("u1".into(), email.to_string()))
        }

        async fn usage(&self, email: &str) -> Result<User, ServiceError> {
            match email {
                "ann@example.com" => Ok(User::new("u1".into(), email.to_string())),
                _ => Err(AccountError::NotFound.into()),
            }
        }

        async fn search_profiles(
            &self,
            criteria: ProfileCriteria,
            ranked: bool,
        ) -> Result<ProfileSearchResult, ServiceError> {
            self.calls
                .lock()
                .await
                .push(Call::Profiles(criteria, ranked));
            Ok(ProfileSearchResult {
                profiles: vec![],
                aggregates: ProfileAggregates::default(),
            })
        }

        async fn import_profiles(
            &self,
            profiles: Vec<CompanyProfile>,
        ) -> Result<usize, ServiceError> {
            self.calls.lock().await.push(Call::Import(profiles.len()));
            Ok(profiles.len())
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                searches: 3,
                analyses: 1,
                records_returned: 12,
                profile_queries: 0,
            }
        }
    }

    async fn send(
        service: Arc<StubReviewService>,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = create_router(service)
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn search_wraps_contacts_in_response_envelope() {
        let service = Arc::new(StubReviewService::default());
        let payload = json!({
            "query": "mobile app development",
            "industries": ["Information technology"],
            "review_date_from": "2023-01-01",
            "limit": 5
        });

        let (status, body) = send(
            service.clone(),
            Method::POST,
            "/api/search",
            Some("good"),
            Some(payload),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["response"][0]["Position"], "CEO");
        assert_eq!(json["response"][0]["Project Tags"], json!(["mobile"]));

        let calls = service.recorded_calls().await;
        let [Call::Search(email, request)] = calls.as_slice() else {
            panic!("expected one search call, got {calls:?}");
        };
        assert_eq!(email, "ann@example.com");
        assert_eq!(request.industries, vec!["Information technology".to_string()]);
        assert_eq!(request.review_date_from.as_deref(), Some("2023-01-01"));
        assert_eq!(request.limit, Some(5));
    }

    #[tokio::test]
    async fn missing_or_rejected_token_is_unauthorized() {
        let service = Arc::new(StubReviewService::default());
        let body = json!({ "query": "anything" });

        let (status, _) = send(
            service.clone(),
            Method::POST,
            "/api/search",
            None,
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            send(service.clone(), Method::POST, "/api/analyze", Some("forged"), Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn exhausted_budget_is_unauthorized_with_reason() {
        let service = Arc::new(StubReviewService::default());
        let (status, body) = send(
            service,
            Method::POST,
            "/api/search",
            Some("spent"),
            Some(json!({ "query": "anything" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            String::from_utf8(body).expect("utf8"),
            "Search API Tokens plan allowance exceeded."
        );
    }

    #[tokio::test]
    async fn analyze_returns_narrative_and_upstream_failure_is_bad_gateway() {
        let service = Arc::new(StubReviewService::default());
        let (status, body) = send(
            service.clone(),
            Method::POST,
            "/api/analyze",
            Some("good"),
            Some(json!({ "query": "speed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["response"], "Vendors were praised for speed.");
        assert_eq!(
            service.recorded_calls().await,
            vec![Call::Analyze("ann@example.com".into())]
        );

        let failing = Arc::new(StubReviewService {
            failing_analysis: true,
            ..Default::default()
        });
        let (status, _) = send(
            failing,
            Method::POST,
            "/api/analyze",
            Some("good"),
            Some(json!({ "query": "speed" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn user_routes_register_and_report_usage() {
        let service = Arc::new(StubReviewService::default());

        let (status, body) =
            send(service.clone(), Method::POST, "/api/user/register", Some("good"), None).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["response"]["email"], "ann@example.com");
        assert_eq!(json["response"]["api_tokens_search_allocated"], 15);

        let (status, _) =
            send(service.clone(), Method::GET, "/api/user/usage", Some("good"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            send(service, Method::GET, "/api/user/usage", Some("spent"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8(body).expect("utf8"), "User Not Found");
    }

    #[tokio::test]
    async fn profile_search_forwards_criteria_and_ranked_flag() {
        let service = Arc::new(StubReviewService::default());
        let criteria = json!({ "industry_names": ["IT"], "feedback_keywords": ["fast"] });

        let (status, body) = send(
            service.clone(),
            Method::POST,
            "/api/profiles/search?ranked=true",
            None,
            Some(criteria),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["profiles"], json!([]));
        assert_eq!(json["aggregates"]["company_count"], 0);

        let (status, _) = send(
            service.clone(),
            Method::POST,
            "/api/profiles/search",
            None,
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let calls = service.recorded_calls().await;
        assert_eq!(calls.len(), 2);
        let Call::Profiles(first, true) = &calls[0] else {
            panic!("expected ranked profile search, got {:?}", calls[0]);
        };
        assert_eq!(first.industry_names, vec!["IT".to_string()]);
        assert_eq!(first.feedback_keywords, vec!["fast".to_string()]);
        assert_eq!(calls[1], Call::Profiles(ProfileCriteria::default(), false));
    }

    #[tokio::test]
    async fn import_reports_inserted_count() {
        let service = Arc::new(StubReviewService::default());
        let profiles = json!([
            { "url": "https://acme.example", "summary": { "name": "Acme" } },
            { "url": "https://beta.example", "summary": { "name": "Beta" } }
        ]);

        let (status, body) = send(
            service.clone(),
            Method::POST,
            "/api/profiles/import",
            None,
            Some(profiles),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["inserted"], 2);
        assert_eq!(service.recorded_calls().await, vec![Call::Import(2)]);
    }

    #[tokio::test]
    async fn metrics_route_exposes_counters() {
        let service = Arc::new(StubReviewService::default());
        let (status, body) = send(service, Method::GET, "/metrics", None, None).await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["searches"], 3);
        assert_eq!(json["recordsReturned"], 12);
    }
}
