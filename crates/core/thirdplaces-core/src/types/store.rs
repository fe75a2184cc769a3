//! Place store boundary

use super::place::{NewPlace, PlaceId, PlaceRecord, PlaceUpdate};
use crate::Result;
use async_trait::async_trait;

/// Ordering applied when fetching places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOrder {
    /// Whatever order the store returns
    #[default]
    Natural,
    /// Newest first by `created_at`
    NewestFirst,
}

/// Remote store of place records
///
/// Reads fail with [`crate::ThirdPlacesError::FetchFailed`], writes with
/// [`crate::ThirdPlacesError::UpdateFailed`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// Fetch every place record
    async fn fetch_places(&self, order: FetchOrder) -> Result<Vec<PlaceRecord>>;

    /// Write the set fields of `update` to the record with `id`
    async fn update_place(&self, id: PlaceId, update: PlaceUpdate) -> Result<()>;

    /// Insert a new record
    async fn insert_place(&self, place: NewPlace) -> Result<()>;
}
