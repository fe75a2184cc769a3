//! Core types and service boundaries

pub mod alert;
pub mod place;
pub mod provider;
pub mod search;
pub mod store;

pub use alert::UserAlert;
pub use place::{Category, NewPlace, PlaceCandidate, PlaceId, PlaceRecord, PlaceUpdate};
pub use provider::{EmbeddingProvider, PlacesLookup};
pub use search::{QueryVector, RankedResult, SearchUpdate};
pub use store::{FetchOrder, PlaceStore};

#[cfg(test)]
pub use provider::{MockEmbeddingProvider, MockPlacesLookup};
#[cfg(test)]
pub use store::MockPlaceStore;
