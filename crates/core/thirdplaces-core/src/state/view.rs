//! What the list and map currently show

use crate::types::{Category, PlaceRecord, RankedResult, SearchUpdate, UserAlert};
use tracing::{debug, warn};

/// Category chip selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every place
    #[default]
    All,
    /// Places of one category
    Only(Category),
}

impl CategoryFilter {
    /// Select `category`; selecting the active category again returns to `All`
    pub fn select(self, category: Option<Category>) -> Self {
        match (self, category) {
            (CategoryFilter::Only(active), Some(chosen)) if active == chosen => CategoryFilter::All,
            (_, Some(chosen)) => CategoryFilter::Only(chosen),
            (_, None) => CategoryFilter::All,
        }
    }

    /// True if `place` passes the filter
    pub fn matches(&self, place: &PlaceRecord) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => place.category() == Some(*category),
        }
    }
}

/// Places to display: non-empty search results win over the filtered feed
pub fn visible_places<'a>(
    places: &'a [PlaceRecord],
    filter: CategoryFilter,
    search_results: &'a [RankedResult],
) -> Vec<&'a PlaceRecord> {
    if !search_results.is_empty() {
        return search_results.iter().map(|r| &r.place).collect();
    }
    places.iter().filter(|p| filter.matches(p)).collect()
}

/// Displayed search results plus any pending alert
#[derive(Debug, Default)]
pub struct SearchResultsView {
    query: Option<String>,
    results: Vec<RankedResult>,
    alert: Option<UserAlert>,
    last_token: u64,
}

impl SearchResultsView {
    /// Empty view
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a delivered search update, returning false if it was dropped
    ///
    /// Updates older than the last applied one are stale and ignored.
    /// Failures keep the displayed results and raise an alert instead.
    pub fn apply(&mut self, update: SearchUpdate) -> bool {
        let token = update.token();
        if token < self.last_token {
            debug!(
                "Ignoring stale search update #{} (showing #{})",
                token, self.last_token
            );
            return false;
        }
        self.last_token = token;

        match update {
            SearchUpdate::Results { query, results, .. } => {
                self.query = Some(query);
                self.results = results;
                self.alert = None;
            }
            SearchUpdate::Cleared { .. } => {
                self.query = None;
                self.results.clear();
                self.alert = None;
            }
            SearchUpdate::Failed { query, error, .. } => {
                warn!("Search for {:?} failed: {}", query, error);
                self.alert = Some(UserAlert::from_error(None, &error));
            }
        }
        true
    }

    /// Query of the displayed results
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Displayed results
    pub fn results(&self) -> &[RankedResult] {
        &self.results
    }

    /// Take the pending alert, if any
    pub fn take_alert(&mut self) -> Option<UserAlert> {
        self.alert.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_place;
    use crate::ThirdPlacesError;

    #[test]
    fn test_select_toggles_back_to_all() {
        let filter = CategoryFilter::All.select(Some(Category::Food));
        assert_eq!(filter, CategoryFilter::Only(Category::Food));
        assert_eq!(filter.select(Some(Category::Food)), CategoryFilter::All);
        assert_eq!(
            filter.select(Some(Category::Outdoors)),
            CategoryFilter::Only(Category::Outdoors)
        );
        assert_eq!(filter.select(None), CategoryFilter::All);
    }

    #[test]
    fn test_filter_matches_case_insensitively() {
        let mut place = sample_place(1, "Rose & Crown", Category::Nightlife);
        place.category = "NIGHTLIFE".to_string();
        assert!(CategoryFilter::Only(Category::Nightlife).matches(&place));
        assert!(!CategoryFilter::Only(Category::Food).matches(&place));

        place.category = "museum".to_string();
        assert!(CategoryFilter::All.matches(&place));
        assert!(!CategoryFilter::Only(Category::Discover).matches(&place));
    }

    #[test]
    fn test_search_results_take_precedence() {
        let places = vec![
            sample_place(1, "a", Category::Food),
            sample_place(2, "b", Category::Outdoors),
        ];
        let filter = CategoryFilter::Only(Category::Food);

        let shown = visible_places(&places, filter, &[]);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, 1);

        let results = vec![RankedResult {
            place: places[1].clone(),
            similarity: 0.8,
        }];
        let shown = visible_places(&places, filter, &results);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, 2);
    }

    #[test]
    fn test_failure_keeps_previous_results() {
        let mut view = SearchResultsView::new();
        view.apply(SearchUpdate::Results {
            token: 1,
            query: "coffee".to_string(),
            results: vec![RankedResult {
                place: sample_place(1, "Coupa", Category::Food),
                similarity: 0.9,
            }],
        });
        view.apply(SearchUpdate::Failed {
            token: 2,
            query: "coffee shop".to_string(),
            error: ThirdPlacesError::search_failed("quota"),
        });

        assert_eq!(view.query(), Some("coffee"));
        assert_eq!(view.results().len(), 1);
        assert!(view.take_alert().is_some());
        assert!(view.take_alert().is_none());

        view.apply(SearchUpdate::Cleared { token: 3 });
        assert!(view.results().is_empty());
        assert_eq!(view.query(), None);
    }

    #[test]
    fn test_late_results_after_clear_are_ignored() {
        let mut view = SearchResultsView::new();
        assert!(view.apply(SearchUpdate::Cleared { token: 5 }));

        let applied = view.apply(SearchUpdate::Results {
            token: 4,
            query: "coffee".to_string(),
            results: vec![RankedResult {
                place: sample_place(1, "Coupa", Category::Food),
                similarity: 0.9,
            }],
        });
        assert!(!applied);
        assert_eq!(view.query(), None);
        assert!(view.results().is_empty());

        let applied = view.apply(SearchUpdate::Failed {
            token: 4,
            query: "coffee".to_string(),
            error: ThirdPlacesError::search_failed("timeout"),
        });
        assert!(!applied);
        assert!(view.take_alert().is_none());
    }
}
