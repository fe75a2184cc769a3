//! External service boundaries: embeddings and third-party place lookup

use super::place::PlaceCandidate;
use super::search::QueryVector;
use crate::Result;
use async_trait::async_trait;

/// Converts text into a fixed-length embedding vector
///
/// Every failure (auth, rate limit, malformed input, empty response) is
/// reported as [`crate::ThirdPlacesError::SearchFailed`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Embed `input`
    async fn embed(&self, input: &str) -> Result<QueryVector>;
}

/// Looks up real-world places by free text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlacesLookup: Send + Sync {
    /// Search for places matching `query`
    async fn text_search(&self, query: &str) -> Result<Vec<PlaceCandidate>>;
}
