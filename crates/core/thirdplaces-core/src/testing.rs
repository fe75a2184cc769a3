//! In-memory fakes for the service boundaries
//!
//! Shared by this crate's tests and the tests of downstream crates.

use crate::types::*;
use crate::{Result, ThirdPlacesError};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Build a place with the given id and embedding; other fields are filler
pub fn place_with_embedding(id: PlaceId, embedding: Option<Vec<f32>>) -> PlaceRecord {
    PlaceRecord {
        id,
        name: format!("Place {}", id),
        address: format!("{} University Ave, Palo Alto, CA", id),
        category: Category::Discover.label().to_string(),
        description: String::new(),
        latitude: 37.4275,
        longitude: -122.1697,
        created_at: base_time() + ChronoDuration::minutes(id),
        likes: 0,
        embedding,
        note: None,
        saved: false,
    }
}

/// Build a named place in a category, without an embedding
pub fn sample_place(id: PlaceId, name: &str, category: Category) -> PlaceRecord {
    PlaceRecord {
        name: name.to_string(),
        category: category.label().to_string(),
        ..place_with_embedding(id, None)
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 26, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Place store backed by a vector, with call counters and failure switches
#[derive(Default)]
pub struct InMemoryPlaceStore {
    places: Mutex<Vec<PlaceRecord>>,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_updates: AtomicBool,
}

impl InMemoryPlaceStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `places` in natural order
    pub fn with_places(places: Vec<PlaceRecord>) -> Self {
        Self {
            places: Mutex::new(places),
            ..Default::default()
        }
    }

    /// Make every fetch fail
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make every update and insert fail
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of fetches issued
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of updates and inserts issued
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Copy of the stored place with `id`
    pub fn get(&self, id: PlaceId) -> Option<PlaceRecord> {
        self.lock().iter().find(|p| p.id == id).cloned()
    }

    /// Copy of every stored place
    pub fn snapshot(&self) -> Vec<PlaceRecord> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PlaceRecord>> {
        self.places.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PlaceStore for InMemoryPlaceStore {
    async fn fetch_places(&self, order: FetchOrder) -> Result<Vec<PlaceRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ThirdPlacesError::fetch_failed("in-memory store offline"));
        }

        let mut places = self.lock().clone();
        if order == FetchOrder::NewestFirst {
            places.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Ok(places)
    }

    async fn update_place(&self, id: PlaceId, update: PlaceUpdate) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(ThirdPlacesError::update_failed("in-memory store offline"));
        }

        let mut places = self.lock();
        let place = places
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ThirdPlacesError::update_failed(format!("no place with id {}", id)))?;
        update.apply_to(place);
        Ok(())
    }

    async fn insert_place(&self, place: NewPlace) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(ThirdPlacesError::update_failed("in-memory store offline"));
        }

        let mut places = self.lock();
        let id = places.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        places.push(PlaceRecord {
            id,
            name: place.name,
            address: place.address,
            category: place.category,
            description: place.description,
            latitude: place.latitude,
            longitude: place.longitude,
            created_at: place.created_at,
            likes: 0,
            embedding: place.embedding,
            note: None,
            saved: false,
        });
        Ok(())
    }
}

/// Embedding provider answering from a lookup table
#[derive(Default)]
pub struct StaticEmbeddingProvider {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Option<Vec<f32>>,
    latency: HashMap<String, Duration>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl StaticEmbeddingProvider {
    /// Provider returning `vector` for every input
    pub fn constant(vector: Vec<f32>) -> Self {
        Self {
            fallback: Some(vector),
            ..Default::default()
        }
    }

    /// Return `vector` for exactly `input`
    pub fn with_vector(mut self, input: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(input.into(), vector);
        self
    }

    /// Delay answers for `input`
    pub fn with_latency(mut self, input: impl Into<String>, latency: Duration) -> Self {
        self.latency.insert(input.into(), latency);
        self
    }

    /// Make every call fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of embed calls issued
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbeddingProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn embed(&self, input: &str) -> Result<QueryVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency.get(input) {
            tokio::time::sleep(*latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ThirdPlacesError::search_failed("static provider unavailable"));
        }

        self.vectors
            .get(input)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ThirdPlacesError::search_failed(format!("no vector for {:?}", input)))
    }
}

/// Places lookup answering with a fixed candidate list
#[derive(Default)]
pub struct StaticPlacesLookup {
    candidates: Vec<PlaceCandidate>,
}

impl StaticPlacesLookup {
    /// Lookup returning `candidates` for every query of 3+ characters
    pub fn new(candidates: Vec<PlaceCandidate>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl PlacesLookup for StaticPlacesLookup {
    async fn text_search(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        if query.trim().chars().count() < 3 {
            return Ok(Vec::new());
        }
        Ok(self.candidates.clone())
    }
}
