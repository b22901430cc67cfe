//! Query vectorization through a hosted embeddings API.

use crate::config::{Config, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// HTTP layer failed before receiving a response.
    #[error("Embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("Unexpected embedding response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Connection settings for [`HttpEmbeddingClient`].
#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    pub endpoint: String,
    pub api_key: String,
    /// Model name, or deployment name for Azure.
    pub model: String,
    /// Only sent to Azure.
    pub api_version: String,
}

impl EmbeddingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider: config.embedding_provider,
            endpoint: config.embedding_endpoint.clone(),
            api_key: config.embedding_api_key.clone(),
            model: config.embedding_model.clone(),
            api_version: config.embedding_api_version.clone(),
        }
    }
}

/// Embeddings over HTTP for Azure OpenAI deployments or the OpenAI API.
pub struct HttpEmbeddingClient {
    client: Client,
    settings: EmbeddingSettings,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbeddingClient {
    /// Build a client with its own connection pool.
    pub fn new(settings: EmbeddingSettings) -> Result<Self, EmbeddingClientError> {
        let client = Client::builder().user_agent("reviewscope/0.1").build()?;
        tracing::debug!(
            provider = ?settings.provider,
            model = %settings.model,
            "Initialized embedding client"
        );
        Ok(Self { client, settings })
    }

    fn request(&self, texts: &[String]) -> reqwest::RequestBuilder {
        let base = self.settings.endpoint.trim_end_matches('/');
        match self.settings.provider {
            EmbeddingProvider::Azure => self
                .client
                .post(format!(
                    "{base}/openai/deployments/{}/embeddings",
                    self.settings.model
                ))
                .query(&[("api-version", self.settings.api_version.as_str())])
                .header("api-key", &self.settings.api_key)
                .json(&json!({ "input": texts })),
            EmbeddingProvider::OpenAI => self
                .client
                .post(format!("{base}/v1/embeddings"))
                .bearer_auth(&self.settings.api_key)
                .json(&json!({ "input": texts, "model": self.settings.model })),
        }
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        tracing::debug!(
            provider = ?self.settings.provider,
            model = %self.settings.model,
            inputs = texts.len(),
            "Generating embeddings"
        );

        let response = self.request(&texts).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = EmbeddingClientError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Embedding request failed");
            return Err(error);
        }

        let EmbeddingResponse { mut data } = response.json().await?;
        if data.len() != texts.len() {
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "expected {} embeddings, received {}",
                texts.len(),
                data.len()
            )));
        }
        data.sort_by_key(|datum| datum.index);

        Ok(data.into_iter().map(|datum| datum.embedding).collect())
    }
}
