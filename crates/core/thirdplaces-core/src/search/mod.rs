//! Semantic search over stored places

pub mod debounce;
pub mod engine;
pub mod similarity;

pub use debounce::DebouncedSearch;
pub use engine::SemanticSearchEngine;
pub use similarity::cosine_similarity;
