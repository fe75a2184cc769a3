//! Client-side state containers
//!
//! Nothing here is global: the shell owns each container and passes it
//! where it is needed.

pub mod feed;
pub mod optimistic;
pub mod saved;
pub mod view;

pub use feed::{LikeSnapshot, PlaceFeed};
pub use optimistic::{MutationOutcome, MutationStatus, OptimisticMutation};
pub use saved::{SavedPlaces, SavedPlacesAction, SavedPlacesController, MAX_NOTE_CHARS};
pub use view::{visible_places, CategoryFilter, SearchResultsView};
