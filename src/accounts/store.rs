//! User persistence and the API request log.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountError, Action, User};

/// One successful paid request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub id: String,
    pub email: String,
    /// `"Search"` or `"Analyze"`.
    pub request_type: String,
    /// Request body as received.
    pub request: Value,
    /// RFC 3339, UTC.
    pub created_at: String,
}

impl RequestLogEntry {
    pub fn new(email: &str, action: Action, request: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            request_type: action.label().to_string(),
            request,
            created_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string()),
        }
    }
}

/// Store of user records keyed by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, email: &str) -> Result<Option<User>, AccountError>;

    /// Create a user with the default plan. An existing record is returned unchanged.
    async fn create_user(&self, email: &str) -> Result<User, AccountError>;

    /// Atomically add `count` to the used counter of `action`.
    async fn increment_usage(
        &self,
        email: &str,
        action: Action,
        count: i64,
    ) -> Result<(), AccountError>;

    async fn log_request(&self, entry: RequestLogEntry) -> Result<(), AccountError>;
}

/// In-process user store for tests and single-session servers. The request log only grows
/// until the process exits; deployments that keep history need a persistent `UserStore`.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
    requests: RwLock<Vec<RequestLogEntry>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record as-is.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.email.clone(), user);
    }

    /// Logged requests in arrival order.
    pub async fn requests(&self) -> Vec<RequestLogEntry> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, email: &str) -> Result<Option<User>, AccountError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create_user(&self, email: &str) -> Result<User, AccountError> {
        let mut users = self.users.write().await;
        let user = users
            .entry(email.to_string())
            .or_insert_with(|| {
                tracing::info!(email, "Registering user");
                User::new(Uuid::new_v4().to_string(), email.to_string())
            })
            .clone();
        Ok(user)
    }

    async fn increment_usage(
        &self,
        email: &str,
        action: Action,
        count: i64,
    ) -> Result<(), AccountError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(email) else {
            tracing::warn!(email, %action, "Usage increment for unknown user ignored");
            return Ok(());
        };
        match action {
            Action::Search => user.api_tokens_search_used += count,
            Action::Analyze => user.api_tokens_analyze_used += count,
        }
        Ok(())
    }

    async fn log_request(&self, entry: RequestLogEntry) -> Result<(), AccountError> {
        self.requests.write().await.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn registration_is_idempotent() {
        let store = MemoryUserStore::new();
        let first = store.create_user("ann@example.com").await.expect("create");
        assert_eq!(first.api_tokens_search_allocated, 15);
        assert_eq!(first.api_tokens_analyze_allocated, 10);

        store
            .increment_usage("ann@example.com", Action::Search, 1)
            .await
            .expect("increment");
        let second = store.create_user("ann@example.com").await.expect("create");
        assert_eq!(second.id, first.id);
        assert_eq!(second.api_tokens_search_used, 1);
    }

    #[tokio::test]
    async fn increments_target_one_counter() {
        let store = MemoryUserStore::new();
        store.create_user("ann@example.com").await.expect("create");
        store
            .increment_usage("ann@example.com", Action::Analyze, 2)
            .await
            .expect("increment");

        let user = store
            .get_user("ann@example.com")
            .await
            .expect("lookup")
            .expect("user");
        assert_eq!(user.api_tokens_analyze_used, 2);
        assert_eq!(user.api_tokens_search_used, 0);
    }

    #[tokio::test]
    async fn request_log_keeps_entries_in_order() {
        let store = MemoryUserStore::new();
        store
            .log_request(RequestLogEntry::new("a@x.io", Action::Search, json!({ "query": "one" })))
            .await
            .expect("log");
        store
            .log_request(RequestLogEntry::new("a@x.io", Action::Analyze, json!({ "query": "two" })))
            .await
            .expect("log");

        let entries = store.requests().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].request_type, "Search");
        assert_eq!(entries[1].request["query"], "two");
        assert!(entries[0].created_at.ends_with('Z'));
        assert_ne!(entries[0].id, entries[1].id);
    }
}
