//! The browsable list of places and per-session likes

use crate::types::{FetchOrder, PlaceId, PlaceRecord, PlaceStore, PlaceUpdate, UserAlert};
use crate::{Result, ThirdPlacesError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::optimistic::{MutationOutcome, OptimisticMutation};

/// Like state of one place as seen by this session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    /// Like counter
    pub likes: u64,
    /// Whether this session has liked the place
    pub liked: bool,
}

/// Places shown in the list and on the map, newest first
pub struct PlaceFeed {
    places: Vec<PlaceRecord>,
    liked: HashSet<PlaceId>,
    store: Arc<dyn PlaceStore>,
}

impl PlaceFeed {
    /// Empty feed over `store`
    pub fn new(store: Arc<dyn PlaceStore>) -> Self {
        Self {
            places: Vec::new(),
            liked: HashSet::new(),
            store,
        }
    }

    /// Fetch places newest first, failing if the store cannot be read
    pub async fn load(store: Arc<dyn PlaceStore>) -> Result<Self> {
        let places = store.fetch_places(FetchOrder::NewestFirst).await?;
        Ok(Self {
            places,
            liked: HashSet::new(),
            store,
        })
    }

    /// Places currently held
    pub fn places(&self) -> &[PlaceRecord] {
        &self.places
    }

    /// Place with `id`
    pub fn get(&self, id: PlaceId) -> Option<&PlaceRecord> {
        self.places.iter().find(|p| p.id == id)
    }

    /// True if this session liked `id`
    pub fn is_liked(&self, id: PlaceId) -> bool {
        self.liked.contains(&id)
    }

    /// Re-fetch places newest first
    ///
    /// On failure the previous list is kept and an alert is returned.
    pub async fn refresh(&mut self) -> Option<UserAlert> {
        match self.store.fetch_places(FetchOrder::NewestFirst).await {
            Ok(places) => {
                info!("Feed refreshed with {} places", places.len());
                self.places = places;
                None
            }
            Err(e) => {
                warn!("Feed refresh failed: {}", e);
                Some(UserAlert::new("Error fetching places", e.to_string()))
            }
        }
    }

    fn snapshot(&self, id: PlaceId) -> Result<LikeSnapshot> {
        let place = self
            .get(id)
            .ok_or_else(|| ThirdPlacesError::not_found(format!("place {} is not in the feed", id)))?;
        Ok(LikeSnapshot {
            likes: place.likes,
            liked: self.is_liked(id),
        })
    }

    fn apply(&mut self, id: PlaceId, snapshot: LikeSnapshot) {
        if let Some(place) = self.places.iter_mut().find(|p| p.id == id) {
            place.likes = snapshot.likes;
        }
        if snapshot.liked {
            self.liked.insert(id);
        } else {
            self.liked.remove(&id);
        }
    }

    /// Apply a like toggle locally and return the pending mutation
    ///
    /// Liking adds one to the counter; unliking removes one, never going
    /// below zero.
    pub fn begin_like_toggle(&mut self, id: PlaceId) -> Result<OptimisticMutation<LikeSnapshot>> {
        let previous = self.snapshot(id)?;
        let proposed = LikeSnapshot {
            likes: if previous.liked {
                previous.likes.saturating_sub(1)
            } else {
                previous.likes + 1
            },
            liked: !previous.liked,
        };
        self.apply(id, proposed);
        Ok(OptimisticMutation::begin(id, previous, proposed))
    }

    /// Restore the state captured by `mutation`
    pub fn roll_back(&mut self, mutation: &mut OptimisticMutation<LikeSnapshot>) {
        let previous = mutation.roll_back();
        self.apply(mutation.place_id(), previous);
    }

    /// Toggle the like on `id`: local update first, then the store write,
    /// rolled back if the write fails
    pub async fn toggle_like(&mut self, id: PlaceId) -> Result<MutationOutcome<LikeSnapshot>> {
        let mut mutation = self.begin_like_toggle(id)?;
        let likes = mutation.proposed().likes;

        match self.store.update_place(id, PlaceUpdate::likes(likes)).await {
            Ok(()) => {
                debug!("Likes for place {} now {}", id, likes);
                mutation.commit();
                Ok(MutationOutcome {
                    mutation,
                    alert: None,
                })
            }
            Err(e) => {
                warn!("Like update for place {} failed, rolling back: {}", id, e);
                self.roll_back(&mut mutation);
                Ok(MutationOutcome {
                    mutation,
                    alert: Some(UserAlert::new(
                        "Error",
                        format!("Failed to update likes: {}", e),
                    )),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MutationStatus;
    use crate::testing::{place_with_embedding, InMemoryPlaceStore};

    async fn feed_with(store: Arc<InMemoryPlaceStore>) -> PlaceFeed {
        let mut feed = PlaceFeed::new(store);
        assert!(feed.refresh().await.is_none());
        feed
    }

    #[tokio::test]
    async fn test_refresh_orders_newest_first() {
        let store = Arc::new(InMemoryPlaceStore::with_places(vec![
            place_with_embedding(1, None),
            place_with_embedding(3, None),
            place_with_embedding(2, None),
        ]));
        let feed = feed_with(store).await;
        let ids: Vec<PlaceId> = feed.places().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_list() {
        let store = Arc::new(InMemoryPlaceStore::with_places(vec![place_with_embedding(
            1, None,
        )]));
        let mut feed = feed_with(store.clone()).await;

        store.set_fail_fetch(true);
        let alert = feed.refresh().await.expect("alert");
        assert_eq!(alert.title, "Error fetching places");
        assert_eq!(feed.places().len(), 1);
    }

    #[tokio::test]
    async fn test_load_propagates_fetch_failure() {
        let store = Arc::new(InMemoryPlaceStore::with_places(vec![place_with_embedding(
            2, None,
        )]));
        let feed = PlaceFeed::load(store.clone()).await.unwrap();
        assert_eq!(feed.places().len(), 1);

        store.set_fail_fetch(true);
        assert!(matches!(
            PlaceFeed::load(store).await,
            Err(ThirdPlacesError::FetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_like_then_unlike() {
        let mut place = place_with_embedding(1, None);
        place.likes = 4;
        let store = Arc::new(InMemoryPlaceStore::with_places(vec![place]));
        let mut feed = feed_with(store.clone()).await;

        let outcome = feed.toggle_like(1).await.unwrap();
        assert!(outcome.is_committed());
        assert_eq!(feed.get(1).unwrap().likes, 5);
        assert!(feed.is_liked(1));
        assert_eq!(store.get(1).unwrap().likes, 5);

        feed.toggle_like(1).await.unwrap();
        assert_eq!(feed.get(1).unwrap().likes, 4);
        assert!(!feed.is_liked(1));
        assert_eq!(store.get(1).unwrap().likes, 4);
    }

    #[tokio::test]
    async fn test_failed_like_reverts() {
        let mut place = place_with_embedding(1, None);
        place.likes = 7;
        let store = Arc::new(InMemoryPlaceStore::with_places(vec![place]));
        let mut feed = feed_with(store.clone()).await;
        store.set_fail_updates(true);

        let outcome = feed.toggle_like(1).await.unwrap();
        assert_eq!(outcome.mutation.status(), MutationStatus::RolledBack);
        assert_eq!(outcome.mutation.previous().likes, 7);
        assert_eq!(outcome.mutation.proposed().likes, 8);
        assert!(outcome.alert.unwrap().message.starts_with("Failed to update likes"));
        assert_eq!(feed.get(1).unwrap().likes, 7);
        assert!(!feed.is_liked(1));
    }

    #[tokio::test]
    async fn test_unlike_never_goes_negative() {
        let store = Arc::new(InMemoryPlaceStore::with_places(vec![place_with_embedding(
            1, None,
        )]));
        let mut feed = feed_with(store).await;
        feed.liked.insert(1);

        let mutation = feed.begin_like_toggle(1).unwrap();
        assert_eq!(mutation.proposed().likes, 0);
        assert!(!mutation.proposed().liked);
    }

    #[tokio::test]
    async fn test_unknown_place() {
        let store = Arc::new(InMemoryPlaceStore::new());
        let mut feed = feed_with(store.clone()).await;
        assert!(matches!(
            feed.toggle_like(9).await,
            Err(ThirdPlacesError::NotFound(_))
        ));
        assert_eq!(store.update_calls(), 0);
    }
}
