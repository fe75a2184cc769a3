//! Semantic place search: embed the query, score every embedded place, keep the top k

use crate::config::SearchConfig;
use crate::types::{EmbeddingProvider, FetchOrder, PlaceStore, RankedResult};
use crate::{Result, ThirdPlacesError};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::similarity::cosine_similarity;

/// Ranks stored places against a free-text query by embedding similarity
pub struct SemanticSearchEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn PlaceStore>,
    config: SearchConfig,
}

impl SemanticSearchEngine {
    /// Create an engine with the default search settings
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn PlaceStore>) -> Self {
        Self::with_config(embedder, store, SearchConfig::default())
    }

    /// Create an engine with custom settings
    pub fn with_config(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn PlaceStore>,
        config: SearchConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Active settings
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// True when `query` is long enough to be sent to the embedding provider
    pub fn is_searchable(&self, query: &str) -> bool {
        let trimmed = query.trim();
        !trimmed.is_empty() && trimmed.chars().count() >= self.config.min_query_chars
    }

    /// Search places for `query`
    ///
    /// Short or blank queries return an empty list without any network call.
    /// The store is only queried once the query embedding is available.
    pub async fn search(&self, query: &str) -> Result<Vec<RankedResult>> {
        if !self.is_searchable(query) {
            debug!("Query {:?} below search threshold, skipping", query);
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await.map_err(|e| {
            warn!("Embedding via {} failed: {}", self.embedder.name(), e);
            match e {
                ThirdPlacesError::SearchFailed(_) => e,
                other => ThirdPlacesError::search_failed(other.to_string()),
            }
        })?;

        let places = self
            .store
            .fetch_places(FetchOrder::Natural)
            .await
            .map_err(|e| {
                warn!("Fetching search candidates failed: {}", e);
                match e {
                    ThirdPlacesError::FetchFailed(_) => e,
                    other => ThirdPlacesError::fetch_failed(other.to_string()),
                }
            })?;
        let total = places.len();

        let mut ranked = Vec::with_capacity(total);
        for place in places {
            let Some(embedding) = place.embedding.as_deref() else {
                continue;
            };
            let similarity = cosine_similarity(&query_vector, embedding, place.id)?;
            if !similarity.is_finite() {
                warn!("Place {} has a non-finite embedding, skipping", place.id);
                continue;
            }
            ranked.push(RankedResult { place, similarity });
        }
        let scored = ranked.len();

        // sort_by is stable, so equal scores keep the store's order
        ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        ranked.truncate(self.config.top_k);

        info!(
            "Search {:?}: {} candidates, {} with embeddings, returning {}",
            query,
            total,
            scored,
            ranked.len()
        );

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::place_with_embedding;
    use crate::types::{MockEmbeddingProvider, MockPlaceStore};

    fn engine(embedder: MockEmbeddingProvider, store: MockPlaceStore) -> SemanticSearchEngine {
        SemanticSearchEngine::new(Arc::new(embedder), Arc::new(store))
    }

    fn quiet_embedder() -> MockEmbeddingProvider {
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_name().return_const("mock".to_string());
        embedder
    }

    #[tokio::test]
    async fn test_short_queries_make_no_calls() {
        let mut embedder = quiet_embedder();
        embedder.expect_embed().never();
        let mut store = MockPlaceStore::new();
        store.expect_fetch_places().never();

        let engine = engine(embedder, store);
        for query in ["", "   ", "ab", "  ab  ", "\tc\n"] {
            assert!(engine.search(query).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_store() {
        let mut embedder = quiet_embedder();
        embedder
            .expect_embed()
            .times(1)
            .returning(|_| Err(ThirdPlacesError::search_failed("rate limited")));
        let mut store = MockPlaceStore::new();
        store.expect_fetch_places().never();

        let err = engine(embedder, store).search("coffee").await.unwrap_err();
        assert!(matches!(err, ThirdPlacesError::SearchFailed(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_fetch_failed() {
        let mut embedder = quiet_embedder();
        embedder
            .expect_embed()
            .times(1)
            .returning(|_| Ok(vec![1.0, 0.0]));
        let mut store = MockPlaceStore::new();
        store
            .expect_fetch_places()
            .times(1)
            .returning(|_| Err(ThirdPlacesError::fetch_failed("connection refused")));

        let err = engine(embedder, store).search("coffee").await.unwrap_err();
        assert!(matches!(err, ThirdPlacesError::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_raw_query_is_embedded() {
        let mut embedder = quiet_embedder();
        embedder
            .expect_embed()
            .withf(|input| input.to_string() == "  late night tacos ")
            .times(1)
            .returning(|_| Ok(vec![1.0]));
        let mut store = MockPlaceStore::new();
        store
            .expect_fetch_places()
            .withf(|order| *order == FetchOrder::Natural)
            .returning(|_| Ok(vec![]));

        let results = engine(embedder, store)
            .search("  late night tacos ")
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_ranks_and_truncates() {
        let mut embedder = quiet_embedder();
        embedder.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
        let mut store = MockPlaceStore::new();
        store.expect_fetch_places().returning(|_| {
            Ok((0..8)
                .map(|i| place_with_embedding(i, Some(vec![i as f32, 8.0 - i as f32])))
                .collect())
        });

        let results = engine(embedder, store).search("quiet study spot").await.unwrap();
        assert_eq!(results.len(), 5);
        let ids: Vec<i64> = results.iter().map(|r| r.place.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
        assert!(results
            .windows(2)
            .all(|w| w[0].similarity >= w[1].similarity));
    }

    #[tokio::test]
    async fn test_ties_keep_store_order() {
        let mut embedder = quiet_embedder();
        embedder.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
        let mut store = MockPlaceStore::new();
        store.expect_fetch_places().returning(|_| {
            Ok(vec![
                place_with_embedding(10, Some(vec![2.0, 0.0])),
                place_with_embedding(11, Some(vec![0.0, 1.0])),
                place_with_embedding(12, Some(vec![4.0, 0.0])),
                place_with_embedding(13, Some(vec![1.0, 0.0])),
            ])
        });

        let results = engine(embedder, store).search("parks").await.unwrap();
        let ids: Vec<i64> = results.iter().map(|r| r.place.id).collect();
        assert_eq!(ids, vec![10, 12, 13, 11]);
    }

    #[tokio::test]
    async fn test_non_finite_embeddings_are_not_ranked() {
        let mut embedder = quiet_embedder();
        embedder.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
        let mut store = MockPlaceStore::new();
        store.expect_fetch_places().returning(|_| {
            Ok(vec![
                place_with_embedding(1, Some(vec![1.0, 0.0])),
                place_with_embedding(2, Some(vec![f32::NAN, 1.0])),
                place_with_embedding(3, Some(vec![f32::INFINITY, 0.0])),
            ])
        });

        let results = engine(embedder, store).search("coffee").await.unwrap();
        let ids: Vec<i64> = results.iter().map(|r| r.place.id).collect();
        assert_eq!(ids, vec![1]);
        assert!(results.iter().all(|r| (-1.0..=1.0).contains(&r.similarity)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_search() {
        let mut embedder = quiet_embedder();
        embedder.expect_embed().returning(|_| Ok(vec![1.0, 0.0, 0.0]));
        let mut store = MockPlaceStore::new();
        store.expect_fetch_places().returning(|_| {
            Ok(vec![
                place_with_embedding(1, Some(vec![1.0, 0.0, 0.0])),
                place_with_embedding(2, Some(vec![1.0, 0.0])),
            ])
        });

        let err = engine(embedder, store).search("bars").await.unwrap_err();
        assert!(matches!(
            err,
            ThirdPlacesError::DimensionMismatch { place_id: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_custom_top_k_and_threshold() {
        let mut embedder = quiet_embedder();
        embedder.expect_embed().returning(|_| Ok(vec![1.0]));
        let mut store = MockPlaceStore::new();
        store.expect_fetch_places().returning(|_| {
            Ok((0..4)
                .map(|i| place_with_embedding(i, Some(vec![1.0])))
                .collect())
        });

        let config = SearchConfig {
            top_k: 2,
            min_query_chars: 1,
            ..Default::default()
        };
        let engine =
            SemanticSearchEngine::with_config(Arc::new(embedder), Arc::new(store), config);
        assert_eq!(engine.search("x").await.unwrap().len(), 2);
    }
}
