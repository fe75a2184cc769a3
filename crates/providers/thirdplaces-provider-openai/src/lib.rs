//! OpenAI embeddings for Third Places

#![warn(missing_docs)]
#![warn(clippy::all)]

use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use std::fmt;
use thirdplaces_core::{
    get_env_or, get_optional_env, get_required_env, http_timeout, EmbeddingProvider,
    QueryVector, Result, ThirdPlacesError,
};
use tracing::{debug, info};

/// Model used when `OPENAI_EMBEDDING_MODEL` is not set
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// OpenAI embedding settings
#[derive(Clone)]
pub struct OpenAIEmbeddingConfig {
    /// API key
    pub api_key: String,
    /// Organization id, if the key belongs to several
    pub organization_id: Option<String>,
    /// Embedding model
    pub model: String,
    /// Requested output dimension; must match the stored embeddings
    pub dimensions: Option<u32>,
}

impl OpenAIEmbeddingConfig {
    /// Config for `api_key` with the default model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            organization_id: None,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: None,
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_ORGANIZATION_ID`, `OPENAI_EMBEDDING_MODEL`
    /// and `OPENAI_EMBEDDING_DIMENSIONS`
    pub fn from_env() -> Result<Self> {
        let dimensions = match get_optional_env("OPENAI_EMBEDDING_DIMENSIONS") {
            Some(raw) => Some(raw.trim().parse::<u32>().map_err(|_| {
                ThirdPlacesError::config(format!(
                    "OPENAI_EMBEDDING_DIMENSIONS must be a positive integer, got '{}'",
                    raw
                ))
            })?),
            None => None,
        };

        Ok(Self {
            api_key: get_required_env("OPENAI_API_KEY")?,
            organization_id: get_optional_env("OPENAI_ORGANIZATION_ID"),
            model: get_env_or("OPENAI_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            dimensions,
        })
    }

    /// Set the organization id
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl fmt::Debug for OpenAIEmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIEmbeddingConfig")
            .field("api_key", &"<redacted>")
            .field("organization_id", &self.organization_id)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

/// Embedding provider backed by the OpenAI embeddings endpoint
pub struct OpenAIEmbeddingProvider {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: Option<u32>,
}

impl OpenAIEmbeddingProvider {
    /// Create a provider
    pub fn new(config: OpenAIEmbeddingConfig) -> Result<Self> {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);
        if let Some(org) = config.organization_id {
            openai_config = openai_config.with_org_id(org);
        }

        let mut client = Client::with_config(openai_config);
        if let Some(timeout) = http_timeout() {
            let http = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| {
                    ThirdPlacesError::config(format!("Failed to create HTTP client: {}", e))
                })?;
            client = client.with_http_client(http);
        }

        info!("OpenAI embedding provider ready (model {})", config.model);
        Ok(Self {
            client,
            model: config.model,
            dimensions: config.dimensions,
        })
    }

    /// Model in use
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn embed(&self, input: &str) -> Result<QueryVector> {
        let mut args = CreateEmbeddingRequestArgs::default();
        args.model(self.model.clone()).input(input);
        if let Some(dimensions) = self.dimensions {
            args.dimensions(dimensions);
        }
        let request = args
            .build()
            .map_err(|e| ThirdPlacesError::search_failed(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| ThirdPlacesError::search_failed(e.to_string()))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|e| e.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ThirdPlacesError::search_failed("No embedding returned"))?;

        debug!("Embedded {} chars into {} dimensions", input.len(), embedding.len());
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OpenAIEmbeddingConfig::new("sk-test")
            .with_organization("org-123")
            .with_model("text-embedding-3-small");
        assert_eq!(config.model, "text-embedding-3-small");
        assert_eq!(config.organization_id.as_deref(), Some("org-123"));
        assert!(config.dimensions.is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", OpenAIEmbeddingConfig::new("sk-very-secret"));
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains(DEFAULT_EMBEDDING_MODEL));
    }

    #[test]
    fn test_provider_creation() {
        let provider = OpenAIEmbeddingProvider::new(OpenAIEmbeddingConfig::new("sk-test")).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), DEFAULT_EMBEDDING_MODEL);
    }
}
