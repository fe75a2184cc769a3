//! Submitting new places found through a third-party lookup

use crate::types::{Category, EmbeddingProvider, NewPlace, PlaceCandidate, PlaceStore};
use crate::{Result, ThirdPlacesError};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Form state for a new place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceSubmission {
    /// Lookup hit the user picked
    pub candidate: Option<PlaceCandidate>,
    /// Category the user picked
    pub category: Option<Category>,
    /// Optional free text
    pub description: String,
}

impl PlaceSubmission {
    /// Build the insert payload, requiring both a place and a category
    pub fn into_new_place(self) -> Result<NewPlace> {
        let (Some(candidate), Some(category)) = (self.candidate, self.category) else {
            return Err(ThirdPlacesError::validation(
                "Please select both a place and category",
            ));
        };

        Ok(NewPlace {
            name: candidate.name,
            address: candidate.address,
            category: category.label().to_string(),
            description: self.description.trim().to_string(),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            created_at: Utc::now(),
            embedding: None,
        })
    }
}

/// Text embedded for a new place so it shows up in semantic search
pub fn embedding_text(place: &NewPlace) -> String {
    [
        place.name.as_str(),
        place.category.as_str(),
        place.description.as_str(),
        place.address.as_str(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(". ")
}

/// Validates submissions, optionally embeds them, and inserts them
pub struct PlaceSubmitter {
    store: Arc<dyn PlaceStore>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl PlaceSubmitter {
    /// Submitter that inserts places without embeddings
    pub fn new(store: Arc<dyn PlaceStore>) -> Self {
        Self {
            store,
            embedder: None,
        }
    }

    /// Embed new places before inserting them
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Validate and insert `submission`, returning what was inserted
    pub async fn submit(&self, submission: PlaceSubmission) -> Result<NewPlace> {
        let mut place = submission.into_new_place()?;

        if let Some(embedder) = &self.embedder {
            match embedder.embed(&embedding_text(&place)).await {
                Ok(vector) => place.embedding = Some(vector),
                Err(e) => warn!(
                    "Embedding for new place {:?} failed, inserting without one: {}",
                    place.name, e
                ),
            }
        }

        self.store.insert_place(place.clone()).await?;
        info!("Added place {:?} ({})", place.name, place.category);
        Ok(place)
    }
}
