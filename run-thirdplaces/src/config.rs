//! Application configuration assembled from the environment

use std::time::Duration;
use thirdplaces_core::{get_optional_env, Result, SearchConfig};
use thirdplaces_provider_google::GooglePlacesConfig;
use thirdplaces_provider_openai::OpenAIEmbeddingConfig;
use thirdplaces_storage_supabase::SupabaseConfig;

/// Search settings given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOverrides {
    /// Maximum number of results
    pub top_k: Option<usize>,
    /// Minimum query length
    pub min_query_chars: Option<usize>,
    /// Debounce delay in milliseconds
    pub debounce_ms: Option<u64>,
}

impl SearchOverrides {
    /// Apply the set fields on top of `config`
    pub fn apply(&self, mut config: SearchConfig) -> Result<SearchConfig> {
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(min) = self.min_query_chars {
            config.min_query_chars = min;
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Typed configuration for every service the shell talks to
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Place store
    pub supabase: SupabaseConfig,
    /// Embeddings; `None` when `OPENAI_API_KEY` is not set
    pub openai: Option<OpenAIEmbeddingConfig>,
    /// Place lookup; `None` when `GOOGLE_PLACES_API_KEY` is not set
    pub google: Option<GooglePlacesConfig>,
    /// Search tuning
    pub search: SearchConfig,
}

impl AppConfig {
    /// Build every section from environment variables
    pub fn from_env() -> Result<Self> {
        let openai = match get_optional_env("OPENAI_API_KEY") {
            Some(_) => Some(OpenAIEmbeddingConfig::from_env()?),
            None => None,
        };

        Ok(Self {
            supabase: SupabaseConfig::from_env()?,
            openai,
            google: GooglePlacesConfig::from_env(),
            search: SearchConfig::from_env()?,
        })
    }

    /// Apply command-line search overrides
    pub fn with_overrides(mut self, overrides: &SearchOverrides) -> Result<Self> {
        self.search = overrides.apply(self.search)?;
        Ok(self)
    }
}
