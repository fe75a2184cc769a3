//! Third Places Core
//!
//! Types, service boundaries and client-side logic for the third places
//! finder:
//!
//! - Semantic place search (query embedding, cosine similarity, top-k)
//! - Debounced search with a stale-response guard
//! - Optimistic likes, bookmarks and notes with rollback
//! - Explicit state containers for the feed, saved places and results
//! - Submission of new places found through a third-party lookup
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use thirdplaces_core::testing::{InMemoryPlaceStore, StaticEmbeddingProvider};
//! use thirdplaces_core::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let embedder = Arc::new(StaticEmbeddingProvider::constant(vec![1.0, 0.0]));
//!     let store = Arc::new(InMemoryPlaceStore::new());
//!     let engine = SemanticSearchEngine::new(embedder, store);
//!     let results = engine.search("quiet coffee shop").await?;
//!     println!("{} results", results.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod search;
pub mod state;
pub mod submission;
pub mod testing;
pub mod types;
pub mod utils;

pub use config::{
    get_env_float, get_env_int, get_env_or, get_optional_env, get_required_env, http_timeout,
    load_env, load_env_from_path, SearchConfig,
};
pub use error::{Result, ThirdPlacesError};
pub use search::{cosine_similarity, DebouncedSearch, SemanticSearchEngine};
pub use state::{
    visible_places, CategoryFilter, LikeSnapshot, MutationOutcome, MutationStatus,
    OptimisticMutation, PlaceFeed, SavedPlaces, SavedPlacesAction, SavedPlacesController,
    SearchResultsView, MAX_NOTE_CHARS,
};
pub use submission::{embedding_text, PlaceSubmission, PlaceSubmitter};
pub use types::*;
pub use utils::init_logging;
