//! Debounced search with a stale-response guard
//!
//! Every [`DebouncedSearch::submit`] takes a new generation token. A call
//! only runs if no newer submit arrived during the debounce delay, and its
//! outcome is only delivered if its token is still the latest when the
//! network calls return. In-flight requests are never aborted; late ones are
//! simply dropped. Updates carry their token, so a receiver can also ignore
//! anything that arrives out of order.

use crate::types::SearchUpdate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::engine::SemanticSearchEngine;

/// Debouncing front for [`SemanticSearchEngine`]
pub struct DebouncedSearch {
    engine: Arc<SemanticSearchEngine>,
    delay: Duration,
    generation: Arc<AtomicU64>,
    updates: mpsc::UnboundedSender<SearchUpdate>,
}

impl DebouncedSearch {
    /// Create a debouncer using the engine's configured delay
    ///
    /// Returns the receiving end on which [`SearchUpdate`]s are delivered.
    pub fn new(engine: Arc<SemanticSearchEngine>) -> (Self, mpsc::UnboundedReceiver<SearchUpdate>) {
        let delay = engine.config().debounce;
        Self::with_delay(engine, delay)
    }

    /// Create a debouncer with an explicit delay
    pub fn with_delay(
        engine: Arc<SemanticSearchEngine>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        (
            Self {
                engine,
                delay,
                generation: Arc::new(AtomicU64::new(0)),
                updates,
            },
            rx,
        )
    }

    /// Token of the most recent submit
    pub fn latest_token(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Submit the current query text
    ///
    /// A blank query clears results immediately and supersedes anything
    /// pending. Must be called from within a tokio runtime.
    pub fn submit(&self, query: impl Into<String>) -> u64 {
        let query = query.into();
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if query.trim().is_empty() {
            let _ = self.updates.send(SearchUpdate::Cleared { token });
            return token;
        }

        let engine = Arc::clone(&self.engine);
        let generation = Arc::clone(&self.generation);
        let updates = self.updates.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != token {
                debug!("Search {:?} superseded before it started", query);
                return;
            }

            let outcome = engine.search(&query).await;

            if generation.load(Ordering::SeqCst) != token {
                debug!("Dropping stale results for {:?}", query);
                return;
            }

            let update = match outcome {
                Ok(results) => SearchUpdate::Results {
                    token,
                    query,
                    results,
                },
                Err(error) => SearchUpdate::Failed {
                    token,
                    query,
                    error,
                },
            };
            let _ = updates.send(update);
        });

        token
    }
}
