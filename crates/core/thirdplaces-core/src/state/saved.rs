//! Saved places (bookmarks and notes)

use crate::types::{PlaceId, PlaceRecord, PlaceStore, PlaceUpdate, UserAlert};
use crate::{Result, ThirdPlacesError};
use std::sync::Arc;
use tracing::{debug, warn};

use super::optimistic::{MutationOutcome, OptimisticMutation};

/// Notes longer than this are cut to this many characters
pub const MAX_NOTE_CHARS: usize = 100;

/// Transitions of the saved-places list
#[derive(Debug, Clone, PartialEq)]
pub enum SavedPlacesAction {
    /// Add the place, or replace the entry with the same id
    Save(PlaceRecord),
    /// Remove the entry with this id
    Unsave(PlaceId),
    /// Set the note of an existing entry
    UpdateNote {
        /// Saved place
        id: PlaceId,
        /// New note
        note: Option<String>,
    },
}

/// The user's saved places, in the order they were saved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedPlaces {
    places: Vec<PlaceRecord>,
}

impl SavedPlaces {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from store records, keeping the ones flagged as saved
    pub fn from_records(records: impl IntoIterator<Item = PlaceRecord>) -> Self {
        Self {
            places: records.into_iter().filter(|p| p.saved).collect(),
        }
    }

    /// Apply `action` and return the next state
    pub fn reduce(mut self, action: SavedPlacesAction) -> Self {
        match action {
            SavedPlacesAction::Save(mut place) => {
                place.saved = true;
                match self.places.iter_mut().find(|p| p.id == place.id) {
                    Some(existing) => *existing = place,
                    None => self.places.push(place),
                }
            }
            SavedPlacesAction::Unsave(id) => {
                self.places.retain(|p| p.id != id);
            }
            SavedPlacesAction::UpdateNote { id, note } => {
                if let Some(existing) = self.places.iter_mut().find(|p| p.id == id) {
                    existing.note = note;
                }
            }
        }
        self
    }

    /// True if `id` is saved
    pub fn contains(&self, id: PlaceId) -> bool {
        self.places.iter().any(|p| p.id == id)
    }

    /// Saved entry for `id`
    pub fn get(&self, id: PlaceId) -> Option<&PlaceRecord> {
        self.places.iter().find(|p| p.id == id)
    }

    /// Saved places in order
    pub fn iter(&self) -> impl Iterator<Item = &PlaceRecord> {
        self.places.iter()
    }

    /// Number of saved places
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// True if nothing is saved
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

/// Owns the saved-places state and persists changes optimistically
pub struct SavedPlacesController {
    state: SavedPlaces,
    store: Arc<dyn PlaceStore>,
}

impl SavedPlacesController {
    /// Create a controller over an initial state
    pub fn new(state: SavedPlaces, store: Arc<dyn PlaceStore>) -> Self {
        Self { state, store }
    }

    /// Current state
    pub fn state(&self) -> &SavedPlaces {
        &self.state
    }

    fn dispatch(&mut self, action: SavedPlacesAction) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    /// Save `place` if it is not saved, unsave it otherwise
    pub async fn toggle_bookmark(&mut self, place: &PlaceRecord) -> MutationOutcome<bool> {
        let was_saved = self.state.contains(place.id);
        let snapshot = self.state.clone();
        let mut mutation = OptimisticMutation::begin(place.id, was_saved, !was_saved);

        if was_saved {
            self.dispatch(SavedPlacesAction::Unsave(place.id));
        } else {
            self.dispatch(SavedPlacesAction::Save(place.clone()));
        }

        match self
            .store
            .update_place(place.id, PlaceUpdate::saved(!was_saved))
            .await
        {
            Ok(()) => {
                debug!("Bookmark for place {} set to {}", place.id, !was_saved);
                mutation.commit();
                MutationOutcome {
                    mutation,
                    alert: None,
                }
            }
            Err(e) => {
                warn!("Bookmark update for place {} failed, rolling back: {}", place.id, e);
                mutation.roll_back();
                self.state = snapshot;
                MutationOutcome {
                    mutation,
                    alert: Some(UserAlert::from_error(Some("Failed to update bookmark"), &e)),
                }
            }
        }
    }

    /// Set the note of a saved place
    ///
    /// Blank text clears the note and longer text is cut to
    /// [`MAX_NOTE_CHARS`]. Fails with [`ThirdPlacesError::NotFound`] if the
    /// place is not saved.
    pub async fn save_note(
        &mut self,
        id: PlaceId,
        note: Option<String>,
    ) -> Result<MutationOutcome<Option<String>>> {
        let previous = self
            .state
            .get(id)
            .ok_or_else(|| ThirdPlacesError::not_found(format!("place {} is not saved", id)))?
            .note
            .clone();
        let note = note
            .filter(|n| !n.trim().is_empty())
            .map(|n| n.chars().take(MAX_NOTE_CHARS).collect::<String>());
        let mut mutation = OptimisticMutation::begin(id, previous, note.clone());

        self.dispatch(SavedPlacesAction::UpdateNote {
            id,
            note: note.clone(),
        });

        match self.store.update_place(id, PlaceUpdate::note(note)).await {
            Ok(()) => {
                mutation.commit();
                Ok(MutationOutcome {
                    mutation,
                    alert: None,
                })
            }
            Err(e) => {
                warn!("Note update for place {} failed, rolling back: {}", id, e);
                let previous = mutation.roll_back();
                self.dispatch(SavedPlacesAction::UpdateNote { id, note: previous });
                Ok(MutationOutcome {
                    mutation,
                    alert: Some(UserAlert::from_error(Some("Failed to save note"), &e)),
                })
            }
        }
    }
}
