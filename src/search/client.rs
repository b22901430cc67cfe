//! HTTP client for the hosted hybrid search index.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::Config;

use super::types::{
    HybridQuery, ReviewDocument, SearchError, SearchResponse, VECTOR_FIELD, VECTOR_NEIGHBOURS,
};

/// Search backend combining vector similarity with lexical/semantic ranking in one call.
#[async_trait]
pub trait HybridSearch: Send + Sync {
    /// Hits ranked by the service's own relevance scoring.
    async fn search(&self, query: &HybridQuery) -> Result<Vec<ReviewDocument>, SearchError>;
}

/// Connection settings for [`AzureSearchService`].
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub endpoint: String,
    pub index_name: String,
    pub api_key: String,
    pub api_version: String,
    pub semantic_configuration: String,
}

impl SearchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.search_endpoint.clone(),
            index_name: config.search_index_name.clone(),
            api_key: config.search_api_key.clone(),
            api_version: config.search_api_version.clone(),
            semantic_configuration: config.semantic_configuration.clone(),
        }
    }
}

/// Azure AI Search REST client.
pub struct AzureSearchService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) settings: SearchSettings,
}

impl AzureSearchService {
    /// Validate the endpoint and build a pooled HTTP client.
    pub fn new(settings: SearchSettings) -> Result<Self, SearchError> {
        let client = Client::builder().user_agent("reviewscope/0.1").build()?;
        let base_url = normalize_base_url(&settings.endpoint).map_err(SearchError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            index = %settings.index_name,
            "Initialized search client"
        );
        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    fn request_body(&self, query: &HybridQuery) -> Value {
        let mut body = json!({
            "search": query.text,
            "vectorQueries": [{
                "kind": "vector",
                "vector": query.vector,
                "k": VECTOR_NEIGHBOURS,
                "fields": VECTOR_FIELD,
            }],
            "select": query.select.join(","),
            "top": query.top,
            "queryType": "semantic",
            "semanticConfiguration": self.settings.semantic_configuration,
            "captions": "extractive",
            "answers": "extractive",
        });
        if let (Some(filter), Some(object)) = (&query.filter, body.as_object_mut()) {
            object.insert("filter".into(), Value::String(filter.clone()));
        }
        body
    }
}

#[async_trait]
impl HybridSearch for AzureSearchService {
    async fn search(&self, query: &HybridQuery) -> Result<Vec<ReviewDocument>, SearchError> {
        let url = format!(
            "{}/indexes/{}/docs/search",
            self.base_url.trim_end_matches('/'),
            self.settings.index_name
        );
        tracing::debug!(
            index = %self.settings.index_name,
            top = query.top,
            filtered = query.filter.is_some(),
            "Issuing hybrid search"
        );

        let response = self
            .client
            .post(url)
            .query(&[("api-version", self.settings.api_version.as_str())])
            .header("api-key", &self.settings.api_key)
            .json(&self.request_body(query))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SearchError::UnexpectedStatus { status, body };
            tracing::error!(index = %self.settings.index_name, error = %error, "Hybrid search failed");
            return Err(error);
        }

        let SearchResponse { value } = response.json().await?;
        tracing::debug!(hits = value.len(), "Hybrid search returned");
        Ok(value)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}
