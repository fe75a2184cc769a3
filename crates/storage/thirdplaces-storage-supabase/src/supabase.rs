//! Supabase place store
//!
//! Reads and writes the places table through the PostgREST API.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use thirdplaces_core::{
    get_env_or, get_required_env, http_timeout, FetchOrder, NewPlace, PlaceId, PlaceRecord,
    PlaceStore, PlaceUpdate, Result, ThirdPlacesError,
};
use tracing::{debug, info, warn};

use crate::rows::{records_from_rows, PlaceRow};

/// Table used when `SUPABASE_PLACES_TABLE` is not set
pub const DEFAULT_PLACES_TABLE: &str = "Places";

/// Supabase configuration
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Supabase project URL (e.g., https://xxx.supabase.co)
    pub url: String,
    /// Supabase anon key
    pub api_key: String,
    /// Table holding place records
    pub places_table: String,
}

impl SupabaseConfig {
    /// Create a new Supabase configuration
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            places_table: DEFAULT_PLACES_TABLE.to_string(),
        }
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `SUPABASE_PLACES_TABLE`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(
            get_required_env("SUPABASE_URL")?,
            get_required_env("SUPABASE_ANON_KEY")?,
        );
        config.places_table = get_env_or("SUPABASE_PLACES_TABLE", DEFAULT_PLACES_TABLE);
        Ok(config)
    }

    /// Use a different places table
    pub fn with_places_table(mut self, table: impl Into<String>) -> Self {
        self.places_table = table.into();
        self
    }

    /// REST URL of the places table
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.url,
            urlencoding::encode(&self.places_table)
        )
    }
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("places_table", &self.places_table)
            .finish()
    }
}

/// Query string for a full fetch
pub fn select_query(order: FetchOrder) -> String {
    match order {
        FetchOrder::Natural => "select=*".to_string(),
        FetchOrder::NewestFirst => "select=*&order=created_at.desc".to_string(),
    }
}

/// Row filter for a single place
pub fn id_filter(id: PlaceId) -> String {
    format!("id=eq.{}", id)
}

/// Place store backed by Supabase
pub struct SupabasePlaceStore {
    config: SupabaseConfig,
    client: Client,
}

impl SupabasePlaceStore {
    /// Create a new store client
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "apikey",
            header::HeaderValue::from_str(&config.api_key)
                .map_err(|e| ThirdPlacesError::config(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|e| ThirdPlacesError::config(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = http_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ThirdPlacesError::config(format!("Failed to create HTTP client: {}", e))
        })?;

        info!(
            "Supabase place store ready: {} (table {})",
            config.url, config.places_table
        );
        Ok(Self { config, client })
    }

    /// Check that the REST endpoint answers
    pub async fn is_ready(&self) -> bool {
        let url = format!("{}/rest/v1/", self.config.url);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("Supabase health check failed: {}", e);
                false
            }
        }
    }

    /// Execute a PATCH against the rows matching `filter`, returning the
    /// number of rows changed
    async fn patch<T: Serialize + ?Sized>(&self, filter: &str, data: &T) -> Result<usize> {
        let url = format!("{}?{}", self.config.table_url(), filter);

        let response = self
            .client
            .patch(&url)
            .header("Prefer", "return=representation")
            .json(data)
            .send()
            .await
            .map_err(|e| ThirdPlacesError::update_failed(format!("Update failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ThirdPlacesError::update_failed(format!(
                "Supabase update failed ({}): {}",
                status, body
            )));
        }

        let rows: Vec<serde_json::Value> = response.json().await.map_err(|e| {
            ThirdPlacesError::update_failed(format!("Failed to parse response: {}", e))
        })?;
        Ok(rows.len())
    }
}

#[async_trait]
impl PlaceStore for SupabasePlaceStore {
    async fn fetch_places(&self, order: FetchOrder) -> Result<Vec<PlaceRecord>> {
        let url = format!("{}?{}", self.config.table_url(), select_query(order));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ThirdPlacesError::fetch_failed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ThirdPlacesError::fetch_failed(format!(
                "Supabase query failed ({}): {}",
                status, body
            )));
        }

        let rows: Vec<PlaceRow> = response.json().await.map_err(|e| {
            ThirdPlacesError::fetch_failed(format!("Failed to parse response: {}", e))
        })?;

        let fetched = rows.len();
        let places = records_from_rows(rows);
        debug!("Fetched {} places ({} skipped)", places.len(), fetched - places.len());
        Ok(places)
    }

    async fn update_place(&self, id: PlaceId, update: PlaceUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }

        let changed = self.patch(&id_filter(id), &update).await?;
        if changed == 0 {
            return Err(ThirdPlacesError::update_failed(format!(
                "No place with id {} was updated",
                id
            )));
        }
        debug!("Updated place {}", id);
        Ok(())
    }

    async fn insert_place(&self, place: NewPlace) -> Result<()> {
        let response = self
            .client
            .post(self.config.table_url())
            .header("Prefer", "return=minimal")
            .json(&[&place])
            .send()
            .await
            .map_err(|e| ThirdPlacesError::update_failed(format!("Insert failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ThirdPlacesError::update_failed(format!(
                "Supabase insert failed ({}): {}",
                status, body
            )));
        }

        info!("Inserted place {:?}", place.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_trims_url() {
        let config = SupabaseConfig::new("https://abc.supabase.co/", "anon");
        assert_eq!(config.table_url(), "https://abc.supabase.co/rest/v1/Places");

        let config = config.with_places_table("Third Places");
        assert_eq!(
            config.table_url(),
            "https://abc.supabase.co/rest/v1/Third%20Places"
        );
    }

    #[test]
    fn test_queries() {
        assert_eq!(select_query(FetchOrder::Natural), "select=*");
        assert_eq!(
            select_query(FetchOrder::NewestFirst),
            "select=*&order=created_at.desc"
        );
        assert_eq!(id_filter(42), "id=eq.42");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", SupabaseConfig::new("https://abc.supabase.co", "eyJsecret"));
        assert!(!rendered.contains("eyJsecret"));
    }

    #[test]
    fn test_store_creation() {
        let store = SupabasePlaceStore::new(SupabaseConfig::new("https://abc.supabase.co", "anon"));
        assert!(store.is_ok());
    }

    #[test]
    fn test_invalid_key_is_config_error() {
        let store = SupabasePlaceStore::new(SupabaseConfig::new("https://abc.supabase.co", "bad\nkey"));
        assert!(matches!(store, Err(ThirdPlacesError::Config(_))));
    }
}
