//! API users and their per-action token budgets.
//!
//! A request is authorized once before any paid work and usage is incremented once after the
//! work succeeds. The check and the increment are separate store calls, so two concurrent
//! requests from one user can both pass a check that only one of them should.

pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{MemoryUserStore, RequestLogEntry, UserStore};

/// Tokens granted to every new user for searches.
pub const DEFAULT_SEARCH_ALLOCATION: i64 = 15;
/// Tokens granted to every new user for analyses.
pub const DEFAULT_ANALYZE_ALLOCATION: i64 = 10;

/// Errors raised by account lookups and budget checks.
#[derive(Debug, Error)]
pub enum AccountError {
    /// No user record exists for the caller.
    #[error("Unauthorized.")]
    Unauthorized,
    /// The user has no allocation for any action.
    #[error("Unauthorized. No API token plan is assigned to this account.")]
    NoPlan,
    /// The budget for the requested action is spent.
    #[error("{0} API Tokens plan allowance exceeded.")]
    AllowanceExceeded(Action),
    /// Usage lookup for an unknown user.
    #[error("User Not Found")]
    NotFound,
    /// Authorization requested for an action that has no budget.
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    /// Backing store failed.
    #[error("User store unavailable: {0}")]
    Store(String),
}

/// Paid actions with their own budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Search,
    Analyze,
}

impl Action {
    /// Label written to the request log.
    pub fn label(self) -> &'static str {
        match self {
            Action::Search => "Search",
            Action::Analyze => "Analyze",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Action::Search),
            "analyze" => Ok(Action::Analyze),
            other => Err(AccountError::InvalidAction(other.to_string())),
        }
    }
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub api_tokens_search_allocated: i64,
    pub api_tokens_search_used: i64,
    pub api_tokens_analyze_allocated: i64,
    pub api_tokens_analyze_used: i64,
}

impl User {
    /// Fresh record with the default plan.
    pub fn new(id: String, email: String) -> Self {
        Self {
            id,
            email,
            api_tokens_search_allocated: DEFAULT_SEARCH_ALLOCATION,
            api_tokens_search_used: 0,
            api_tokens_analyze_allocated: DEFAULT_ANALYZE_ALLOCATION,
            api_tokens_analyze_used: 0,
        }
    }

    /// Tokens left for `action`; zero or negative means exhausted.
    pub fn remaining(&self, action: Action) -> i64 {
        match action {
            Action::Search => self.api_tokens_search_allocated - self.api_tokens_search_used,
            Action::Analyze => self.api_tokens_analyze_allocated - self.api_tokens_analyze_used,
        }
    }

    fn has_plan(&self) -> bool {
        self.api_tokens_search_allocated != 0 || self.api_tokens_analyze_allocated != 0
    }
}

/// Check that `email` may perform `action` and return the current record.
///
/// Order of checks: unknown user, no plan at all, unknown action, exhausted budget.
pub async fn ensure_authorised_access(
    store: &dyn UserStore,
    email: &str,
    action: &str,
) -> Result<User, AccountError> {
    let user = store
        .get_user(email)
        .await?
        .ok_or(AccountError::Unauthorized)?;

    if !user.has_plan() {
        return Err(AccountError::NoPlan);
    }

    let action: Action = action.parse()?;
    if user.remaining(action) <= 0 {
        tracing::info!(email, %action, "Token allowance exhausted");
        return Err(AccountError::AllowanceExceeded(action));
    }

    Ok(user)
}
