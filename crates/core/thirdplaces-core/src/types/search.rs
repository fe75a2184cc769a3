//! Search result types

use super::place::PlaceRecord;
use crate::ThirdPlacesError;
use serde::Serialize;

/// Embedding of a query string; lives for a single search call
pub type QueryVector = Vec<f32>;

/// A place with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    /// The matched place
    #[serde(flatten)]
    pub place: PlaceRecord,
    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
}

/// Outcome of a debounced search
///
/// Every update carries the generation token of the submit that produced
/// it; a higher token always belongs to a newer submit.
#[derive(Debug)]
pub enum SearchUpdate {
    /// Ranked results for `query` (possibly empty)
    Results {
        /// Submit token
        token: u64,
        /// Query text as submitted
        query: String,
        /// Ranked results, best first
        results: Vec<RankedResult>,
    },
    /// The query was cleared; displayed results should be emptied
    Cleared {
        /// Submit token
        token: u64,
    },
    /// The search for `query` failed; displayed results should stay as they are
    Failed {
        /// Submit token
        token: u64,
        /// Query text as submitted
        query: String,
        /// What went wrong
        error: ThirdPlacesError,
    },
}

impl SearchUpdate {
    /// Token of the submit this update answers
    pub fn token(&self) -> u64 {
        match self {
            SearchUpdate::Results { token, .. }
            | SearchUpdate::Cleared { token }
            | SearchUpdate::Failed { token, .. } => *token,
        }
    }

    /// Query this update belongs to (`None` for [`SearchUpdate::Cleared`])
    pub fn query(&self) -> Option<&str> {
        match self {
            SearchUpdate::Results { query, .. } | SearchUpdate::Failed { query, .. } => {
                Some(query)
            }
            SearchUpdate::Cleared { .. } => None,
        }
    }
}
