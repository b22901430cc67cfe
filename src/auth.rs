//! Bearer-token authentication against an OAuth userinfo endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while resolving a caller's identity.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer ...` header was supplied.
    #[error("Missing or invalid auth header")]
    MissingToken,
    /// Identity provider rejected the token.
    #[error("Invalid access token")]
    InvalidToken,
    /// Token was accepted but carries no email claim.
    #[error("Email not found in user info")]
    MissingEmail,
    /// Identity provider could not be reached.
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Exchanges an access token for the caller's email address.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn email_for_token(&self, token: &str) -> Result<String, AuthError>;
}

/// OAuth userinfo client (Google by default).
pub struct UserInfoIdentityProvider {
    http: Client,
    userinfo_url: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
}

impl UserInfoIdentityProvider {
    pub fn new(userinfo_url: impl Into<String>) -> Result<Self, AuthError> {
        let http = Client::builder()
            .user_agent("reviewscope/auth")
            .build()
            .map_err(|error| AuthError::Unavailable(error.to_string()))?;
        Ok(Self {
            http,
            userinfo_url: userinfo_url.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for UserInfoIdentityProvider {
    async fn email_for_token(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|error| AuthError::Unavailable(error.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Identity provider rejected token");
            return Err(AuthError::InvalidToken);
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|error| AuthError::Unavailable(error.to_string()))?;
        info.email
            .filter(|email| !email.is_empty())
            .ok_or(AuthError::MissingEmail)
    }
}
