//! Service wiring shared by every command

use std::sync::Arc;
use thirdplaces_adaptor_terminal::{TerminalAdaptor, TerminalConfig};
use thirdplaces_core::{
    EmbeddingProvider, PlaceStore, PlacesLookup, Result, SearchConfig, SemanticSearchEngine,
    ThirdPlacesError,
};
use thirdplaces_provider_google::GooglePlacesClient;
use thirdplaces_provider_openai::OpenAIEmbeddingProvider;
use thirdplaces_storage_supabase::SupabasePlaceStore;
use tracing::info;

use crate::config::AppConfig;

/// Connected services plus the terminal
pub struct App {
    pub store: Arc<dyn PlaceStore>,
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub lookup: Option<Arc<dyn PlacesLookup>>,
    pub search: SearchConfig,
    pub terminal: TerminalAdaptor,
}

impl App {
    /// Create the HTTP clients described by `config`
    pub fn connect(config: AppConfig, terminal: TerminalConfig) -> Result<Self> {
        let store: Arc<dyn PlaceStore> = Arc::new(SupabasePlaceStore::new(config.supabase)?);

        let embedder = match config.openai {
            Some(openai) => {
                let provider = OpenAIEmbeddingProvider::new(openai)?;
                info!("Embeddings via {}", provider.model());
                Some(Arc::new(provider) as Arc<dyn EmbeddingProvider>)
            }
            None => None,
        };

        let lookup = match config.google {
            Some(google) => Some(Arc::new(GooglePlacesClient::new(google)?) as Arc<dyn PlacesLookup>),
            None => None,
        };

        Ok(Self {
            store,
            embedder,
            lookup,
            search: config.search,
            terminal: TerminalAdaptor::new(terminal)?,
        })
    }

    /// Embedding provider, required for search
    pub fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        self.embedder.clone().ok_or_else(|| {
            ThirdPlacesError::config("OPENAI_API_KEY is required for semantic search")
        })
    }

    /// Places lookup, required for submissions
    pub fn lookup(&self) -> Result<Arc<dyn PlacesLookup>> {
        self.lookup.clone().ok_or_else(|| {
            ThirdPlacesError::config("GOOGLE_PLACES_API_KEY is required to look up places")
        })
    }

    /// Search engine over the configured services
    pub fn engine(&self) -> Result<Arc<SemanticSearchEngine>> {
        Ok(Arc::new(SemanticSearchEngine::with_config(
            self.embedder()?,
            Arc::clone(&self.store),
            self.search.clone(),
        )))
    }
}
