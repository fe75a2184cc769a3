//! Row shapes of the `Places` table as returned by PostgREST

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thirdplaces_core::{PlaceRecord, Result, ThirdPlacesError};
use tracing::warn;

/// pgvector columns come back as text (`"[0.1,0.2]"`); float arrays and
/// JSON columns come back as arrays
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingColumn {
    /// JSON array
    Array(Vec<f32>),
    /// pgvector text form
    Text(String),
}

impl EmbeddingColumn {
    /// Decode into a vector
    pub fn into_vector(self) -> Result<Vec<f32>> {
        let vector = self.decode()?;
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(ThirdPlacesError::fetch_failed(
                "Embedding has non-finite components",
            ));
        }
        Ok(vector)
    }

    fn decode(self) -> Result<Vec<f32>> {
        match self {
            EmbeddingColumn::Array(v) => Ok(v),
            EmbeddingColumn::Text(text) => {
                let inner = text
                    .trim()
                    .strip_prefix('[')
                    .and_then(|t| t.strip_suffix(']'))
                    .ok_or_else(|| {
                        ThirdPlacesError::fetch_failed("Embedding text is not a bracketed list")
                    })?;
                if inner.trim().is_empty() {
                    return Ok(Vec::new());
                }
                inner
                    .split(',')
                    .map(|part| {
                        part.trim().parse::<f32>().map_err(|e| {
                            ThirdPlacesError::fetch_failed(format!(
                                "Invalid embedding component '{}': {}",
                                part.trim(),
                                e
                            ))
                        })
                    })
                    .collect()
            }
        }
    }
}

/// One row of the places table
#[derive(Debug, Deserialize)]
pub struct PlaceRow {
    id: i64,
    name: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    latitude: f64,
    longitude: f64,
    created_at: String,
    #[serde(default)]
    likes: Option<i64>,
    #[serde(default)]
    embedding: Option<EmbeddingColumn>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    saved: Option<bool>,
}

/// Parse `timestamptz` output, or `timestamp` output read as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

impl TryFrom<PlaceRow> for PlaceRecord {
    type Error = ThirdPlacesError;

    fn try_from(row: PlaceRow) -> Result<Self> {
        let created_at = parse_timestamp(&row.created_at).ok_or_else(|| {
            ThirdPlacesError::fetch_failed(format!(
                "Place {} has an unreadable created_at '{}'",
                row.id, row.created_at
            ))
        })?;
        let embedding = row.embedding.map(EmbeddingColumn::into_vector).transpose()?;

        Ok(PlaceRecord {
            id: row.id,
            name: row.name,
            address: row.address.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            latitude: row.latitude,
            longitude: row.longitude,
            created_at,
            likes: row.likes.unwrap_or(0).max(0) as u64,
            embedding,
            note: row.note,
            saved: row.saved.unwrap_or(false),
        })
    }
}

/// Convert fetched rows, skipping any row that cannot be decoded
pub fn records_from_rows(rows: Vec<PlaceRow>) -> Vec<PlaceRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match PlaceRecord::try_from(row) {
                Ok(place) => Some(place),
                Err(e) => {
                    warn!("Skipping place {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(embedding: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": 4,
            "name": "Philz Coffee",
            "address": "101 Forest Ave",
            "category": "food",
            "description": null,
            "latitude": 37.442,
            "longitude": -122.161,
            "created_at": "2024-11-26T18:30:00.123456+00:00",
            "likes": 3,
            "embedding": embedding
        })
    }

    fn record(json: serde_json::Value) -> PlaceRecord {
        let row: PlaceRow = serde_json::from_value(json).unwrap();
        row.try_into().unwrap()
    }

    #[test]
    fn test_text_and_array_embeddings_agree() {
        let from_text = record(row(serde_json::json!("[0.25,-0.5, 1]")));
        let from_array = record(row(serde_json::json!([0.25, -0.5, 1.0])));
        assert_eq!(from_text.embedding, Some(vec![0.25, -0.5, 1.0]));
        assert_eq!(from_text.embedding, from_array.embedding);
    }

    #[test]
    fn test_null_fields() {
        let place = record(row(serde_json::Value::Null));
        assert!(place.embedding.is_none());
        assert_eq!(place.description, "");
        assert_eq!(place.likes, 3);
        assert!(!place.saved);
    }

    #[test]
    fn test_bad_embedding_text_is_fetch_failure() {
        let row: PlaceRow = serde_json::from_value(row(serde_json::json!("[0.1,abc]"))).unwrap();
        let err = PlaceRecord::try_from(row).unwrap_err();
        assert!(matches!(err, ThirdPlacesError::FetchFailed(_)));
    }

    #[test]
    fn test_non_finite_embedding_text_is_rejected() {
        for text in ["[NaN,1]", "[inf,0]", "[1,-inf]"] {
            let err = EmbeddingColumn::Text(text.to_string())
                .into_vector()
                .unwrap_err();
            assert!(matches!(err, ThirdPlacesError::FetchFailed(_)));
        }
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let mut bad_time = row(serde_json::Value::Null);
        bad_time["id"] = serde_json::json!(5);
        bad_time["created_at"] = serde_json::json!("yesterday");
        let mut bad_embedding = row(serde_json::json!("[NaN,1]"));
        bad_embedding["id"] = serde_json::json!(6);

        let rows: Vec<PlaceRow> = serde_json::from_value(serde_json::json!([
            row(serde_json::json!([1.0, 0.0])),
            bad_time,
            bad_embedding
        ]))
        .unwrap();

        let places = records_from_rows(rows);
        let ids: Vec<i64> = places.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2024-11-26T18:30:00Z").is_some());
        assert!(parse_timestamp("2024-11-26T18:30:00.5").is_some());
        assert!(parse_timestamp("2024-11-26 18:30:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
