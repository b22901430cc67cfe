use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_SEARCH_API_VERSION: &str = "2024-07-01";
const DEFAULT_SEMANTIC_CONFIGURATION: &str = "semantic-configuration";
const DEFAULT_EMBEDDING_API_VERSION: &str = "2023-05-15";
const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const DEFAULT_SEARCH_LIMIT: usize = 500;
const DEFAULT_ANALYZE_LIMIT: usize = 25;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the review search server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the hybrid search service.
    pub search_endpoint: String,
    /// Index holding the flattened review documents.
    pub search_index_name: String,
    /// Admin or query key for the search service.
    pub search_api_key: String,
    /// REST API version sent with every search request.
    pub search_api_version: String,
    /// Semantic ranking configuration defined on the index.
    pub semantic_configuration: String,
    /// Embedding provider used to vectorize queries.
    pub embedding_provider: EmbeddingProvider,
    /// Base URL of the embedding API.
    pub embedding_endpoint: String,
    /// API key for the embedding provider.
    pub embedding_api_key: String,
    /// API version used by Azure-hosted embedding deployments.
    pub embedding_api_version: String,
    /// Embedding model (or Azure deployment) name.
    pub embedding_model: String,
    /// Base URL of the OpenAI-compatible chat completion API.
    pub completion_base_url: String,
    /// API key for the chat completion API.
    pub completion_api_key: String,
    /// Chat model used for digests and the final synthesis.
    pub completion_model: String,
    /// OAuth userinfo endpoint used to resolve bearer tokens into emails.
    pub identity_userinfo_url: String,
    /// Optional JSON dump used to seed the profile store.
    pub profiles_path: Option<String>,
    /// Result count requested from the search service for contact listings.
    pub search_default_limit: usize,
    /// Result count requested from the search service for analyses.
    pub analyze_limit: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported embedding backends.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Azure OpenAI deployment (`/openai/deployments/{model}/embeddings`).
    Azure,
    /// Hosted OpenAI embeddings API (`/v1/embeddings`).
    OpenAI,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            search_endpoint: load_env("SEARCH_ENDPOINT")?,
            search_index_name: load_env("SEARCH_INDEX_NAME")?,
            search_api_key: load_env("SEARCH_API_KEY")?,
            search_api_version: load_env_optional("SEARCH_API_VERSION")
                .unwrap_or_else(|| DEFAULT_SEARCH_API_VERSION.to_string()),
            semantic_configuration: load_env_optional("SEARCH_SEMANTIC_CONFIGURATION")
                .unwrap_or_else(|| DEFAULT_SEMANTIC_CONFIGURATION.to_string()),
            embedding_provider: load_env_optional("EMBEDDING_PROVIDER")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".into()))
                })
                .transpose()?
                .unwrap_or(EmbeddingProvider::Azure),
            embedding_endpoint: load_env("EMBEDDING_ENDPOINT")?,
            embedding_api_key: load_env("EMBEDDING_API_KEY")?,
            embedding_api_version: load_env_optional("EMBEDDING_API_VERSION")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_API_VERSION.to_string()),
            embedding_model: load_env("EMBEDDING_MODEL")?,
            completion_base_url: load_env_optional("COMPLETION_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string()),
            completion_api_key: load_env("COMPLETION_API_KEY")?,
            completion_model: load_env_optional("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            identity_userinfo_url: load_env_optional("IDENTITY_USERINFO_URL")
                .unwrap_or_else(|| DEFAULT_USERINFO_URL.to_string()),
            profiles_path: load_env_optional("PROFILES_PATH"),
            search_default_limit: parse_optional("SEARCH_DEFAULT_LIMIT")?
                .unwrap_or(DEFAULT_SEARCH_LIMIT),
            analyze_limit: parse_optional("ANALYZE_LIMIT")?.unwrap_or(DEFAULT_ANALYZE_LIMIT),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "azure" | "azure-openai" => Ok(Self::Azure),
            "openai" => Ok(Self::OpenAI),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        search_endpoint = %config.search_endpoint,
        index = %config.search_index_name,
        embedding_provider = ?config.embedding_provider,
        completion_model = %config.completion_model,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
