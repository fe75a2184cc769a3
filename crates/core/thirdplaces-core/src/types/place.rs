//! Place records and the payloads used to write them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Place identifier as assigned by the store
pub type PlaceId = i64;

/// A point of interest as held by the place store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Unique identifier
    pub id: PlaceId,
    /// Display name
    pub name: String,
    /// Formatted street address
    #[serde(default)]
    pub address: String,
    /// Enum-like category label (see [`Category`])
    #[serde(default)]
    pub category: String,
    /// Free-text description written by the submitter
    #[serde(default)]
    pub description: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Like counter; a null column reads as zero
    #[serde(default, deserialize_with = "null_as_zero")]
    pub likes: u64,
    /// Precomputed embedding; records without one are never ranked
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// Personal note attached to a saved place
    #[serde(default)]
    pub note: Option<String>,
    /// Whether the place is bookmarked
    #[serde(default)]
    pub saved: bool,
}

impl PlaceRecord {
    /// Parsed category, if the label is one of the known categories
    pub fn category(&self) -> Option<Category> {
        Category::from_label(&self.category)
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Known place categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Restaurants, cafes, bakeries
    Food,
    /// Bars and venues
    Nightlife,
    /// Parks, trails, open air
    Outdoors,
    /// Places to sit down and work
    Workspace,
    /// Anything else worth a visit
    Discover,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Nightlife,
        Category::Outdoors,
        Category::Workspace,
        Category::Discover,
    ];

    /// Parse a label case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "food" => Some(Category::Food),
            "nightlife" => Some(Category::Nightlife),
            "outdoors" => Some(Category::Outdoors),
            "workspace" => Some(Category::Workspace),
            "discover" => Some(Category::Discover),
            _ => None,
        }
    }

    /// Label as stored in the `category` column
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Nightlife => "Nightlife",
            Category::Outdoors => "Outdoors",
            Category::Workspace => "Workspace",
            Category::Discover => "Discover",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::ThirdPlacesError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Category::from_label(s).ok_or_else(|| {
            crate::ThirdPlacesError::validation(format!("Unknown category '{}'", s))
        })
    }
}

/// Insert payload for a newly submitted place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlace {
    /// Display name
    pub name: String,
    /// Formatted street address
    pub address: String,
    /// Category label
    pub category: String,
    /// Free-text description
    pub description: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Embedding, when one could be computed at submission time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Sparse update; only the fields that are set get written
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaceUpdate {
    /// New like count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    /// New note (`Some(None)` clears it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
    /// New bookmark flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
}

impl PlaceUpdate {
    /// Update only the like counter
    pub fn likes(likes: u64) -> Self {
        Self {
            likes: Some(likes),
            ..Default::default()
        }
    }

    /// Update only the note
    pub fn note(note: Option<String>) -> Self {
        Self {
            note: Some(note),
            ..Default::default()
        }
    }

    /// Update only the bookmark flag
    pub fn saved(saved: bool) -> Self {
        Self {
            saved: Some(saved),
            ..Default::default()
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.likes.is_none() && self.note.is_none() && self.saved.is_none()
    }

    /// Apply the set fields to a local record
    pub fn apply_to(&self, place: &mut PlaceRecord) {
        if let Some(likes) = self.likes {
            place.likes = likes;
        }
        if let Some(note) = &self.note {
            place.note = note.clone();
        }
        if let Some(saved) = self.saved {
            place.saved = saved;
        }
    }
}

/// A hit from a third-party places lookup, before it becomes a [`NewPlace`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    /// Provider-specific place id
    pub place_id: String,
    /// Display name
    pub name: String,
    /// Formatted street address
    pub address: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing_is_case_insensitive() {
        assert_eq!(Category::from_label("Food"), Some(Category::Food));
        assert_eq!(Category::from_label(" NIGHTLIFE "), Some(Category::Nightlife));
        assert_eq!(Category::from_label("museum"), None);
        assert!("workspace".parse::<Category>().is_ok());
        assert!("nope".parse::<Category>().is_err());
    }

    #[test]
    fn test_null_likes_reads_as_zero() {
        let json = serde_json::json!({
            "id": 1,
            "name": "Coupa Cafe",
            "address": "538 Ramona St",
            "category": "Food",
            "description": "",
            "latitude": 37.44,
            "longitude": -122.16,
            "created_at": "2024-11-26T10:00:00Z",
            "likes": null,
            "embedding": null
        });
        let place: PlaceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(place.likes, 0);
        assert!(place.embedding.is_none());
        assert!(!place.saved);
        assert_eq!(place.category(), Some(Category::Food));
    }

    #[test]
    fn test_place_update_serializes_only_set_fields() {
        let body = serde_json::to_value(PlaceUpdate::likes(4)).unwrap();
        assert_eq!(body, serde_json::json!({ "likes": 4 }));

        let body = serde_json::to_value(PlaceUpdate::note(None)).unwrap();
        assert_eq!(body, serde_json::json!({ "note": null }));

        assert!(PlaceUpdate::default().is_empty());
    }
}
