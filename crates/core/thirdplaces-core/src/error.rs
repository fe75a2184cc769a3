//! Error types for Third Places core

use thiserror::Error;

/// Main error type for Third Places operations
#[derive(Debug, Error)]
pub enum ThirdPlacesError {
    /// The embedding provider was unavailable or returned a malformed response
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// The place store could not be read
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// The place store rejected a write
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    /// Query and candidate embeddings have different lengths
    #[error(
        "Embedding dimension mismatch for place {place_id}: query has {expected}, candidate has {actual}"
    )]
    DimensionMismatch {
        /// Query vector length
        expected: usize,
        /// Candidate embedding length
        actual: usize,
        /// Offending place
        place_id: i64,
    },

    /// Third-party place lookup failed
    #[error("Places lookup failed: {0}")]
    PlacesLookupFailed(String),

    /// Not found error (generic)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenient Result type using ThirdPlacesError
pub type Result<T> = std::result::Result<T, ThirdPlacesError>;

impl ThirdPlacesError {
    /// Create a search-failed error
    pub fn search_failed(msg: impl Into<String>) -> Self {
        ThirdPlacesError::SearchFailed(msg.into())
    }

    /// Create a fetch-failed error
    pub fn fetch_failed(msg: impl Into<String>) -> Self {
        ThirdPlacesError::FetchFailed(msg.into())
    }

    /// Create an update-failed error
    pub fn update_failed(msg: impl Into<String>) -> Self {
        ThirdPlacesError::UpdateFailed(msg.into())
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(expected: usize, actual: usize, place_id: i64) -> Self {
        ThirdPlacesError::DimensionMismatch {
            expected,
            actual,
            place_id,
        }
    }

    /// Create a places lookup error
    pub fn places_lookup(msg: impl Into<String>) -> Self {
        ThirdPlacesError::PlacesLookupFailed(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        ThirdPlacesError::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        ThirdPlacesError::Validation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        ThirdPlacesError::Config(msg.into())
    }

    /// Short title shown to the user when this error surfaces as an alert
    pub fn alert_title(&self) -> &'static str {
        match self {
            ThirdPlacesError::SearchFailed(_) | ThirdPlacesError::DimensionMismatch { .. } => {
                "Search unavailable"
            }
            ThirdPlacesError::FetchFailed(_) => "Error fetching places",
            ThirdPlacesError::UpdateFailed(_) => "Error",
            ThirdPlacesError::PlacesLookupFailed(_) => "Error",
            ThirdPlacesError::Validation(_) => "Error",
            _ => "Unexpected error",
        }
    }
}
