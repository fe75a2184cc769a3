//! Google Places text search
//!
//! Used by the submission flow to turn a typed name into a real place with
//! an address and coordinates. Results are biased towards a configured
//! location.

#![warn(missing_docs)]
#![warn(clippy::all)]

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use thirdplaces_core::{
    get_env_float, get_env_int, get_optional_env, http_timeout, PlaceCandidate, PlacesLookup,
    Result, ThirdPlacesError,
};
use tracing::{debug, info, warn};

/// Places API root
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Queries shorter than this are not sent
pub const MIN_QUERY_CHARS: usize = 3;

/// Google Places settings
#[derive(Clone)]
pub struct GooglePlacesConfig {
    /// API key
    pub api_key: String,
    /// Bias centre latitude
    pub bias_lat: f64,
    /// Bias centre longitude
    pub bias_lng: f64,
    /// Bias radius in metres
    pub radius_m: u32,
    /// API root, overridable for proxies
    pub base_url: String,
}

impl GooglePlacesConfig {
    /// Config for `api_key`, biased to Stanford's main quad
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            bias_lat: 37.4275,
            bias_lng: -122.1697,
            radius_m: 5000,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Read `GOOGLE_PLACES_API_KEY` and the `PLACES_BIAS_*` settings
    ///
    /// Returns `None` when no key is configured; submissions are then
    /// unavailable.
    pub fn from_env() -> Option<Self> {
        let defaults = Self::new(get_optional_env("GOOGLE_PLACES_API_KEY")?);
        Some(Self {
            bias_lat: get_env_float("PLACES_BIAS_LAT", defaults.bias_lat),
            bias_lng: get_env_float("PLACES_BIAS_LNG", defaults.bias_lng),
            radius_m: get_env_int("PLACES_BIAS_RADIUS_M", defaults.radius_m),
            ..defaults
        })
    }

    /// Text-search URL for `query`
    pub fn text_search_url(&self, query: &str) -> String {
        format!(
            "{}/textsearch/json?query={}&location={},{}&radius={}&locationbias=circle:{}@{},{}&key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query),
            self.bias_lat,
            self.bias_lng,
            self.radius_m,
            self.radius_m,
            self.bias_lat,
            self.bias_lng,
            urlencoding::encode(&self.api_key),
        )
    }
}

impl fmt::Debug for GooglePlacesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GooglePlacesConfig")
            .field("api_key", &"<redacted>")
            .field("bias_lat", &self.bias_lat)
            .field("bias_lng", &self.bias_lng)
            .field("radius_m", &self.radius_m)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<TextSearchResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    place_id: String,
    name: String,
    #[serde(default)]
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Convert a text-search response body into candidates
///
/// Any status other than `OK` is an error, including `ZERO_RESULTS`.
fn parse_text_search(body: TextSearchResponse) -> Result<Vec<PlaceCandidate>> {
    if body.status != "OK" {
        let detail = body
            .error_message
            .map(|m| format!("{}: {}", body.status, m))
            .unwrap_or(body.status);
        return Err(ThirdPlacesError::places_lookup(format!(
            "Failed to fetch places ({})",
            detail
        )));
    }

    Ok(body
        .results
        .into_iter()
        .map(|r| PlaceCandidate {
            place_id: r.place_id,
            name: r.name,
            address: r.formatted_address,
            latitude: r.geometry.location.lat,
            longitude: r.geometry.location.lng,
        })
        .collect())
}

/// Google Places text-search client
pub struct GooglePlacesClient {
    config: GooglePlacesConfig,
    client: Client,
}

impl GooglePlacesClient {
    /// Create a client
    pub fn new(config: GooglePlacesConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = http_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ThirdPlacesError::config(format!("Failed to create HTTP client: {}", e))
        })?;

        info!(
            "Google Places lookup biased to {},{} within {}m",
            config.bias_lat, config.bias_lng, config.radius_m
        );
        Ok(Self { config, client })
    }
}

#[async_trait]
impl PlacesLookup for GooglePlacesClient {
    async fn text_search(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        if query.trim().chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(self.config.text_search_url(query))
            .send()
            .await
            .map_err(|e| {
                ThirdPlacesError::places_lookup(format!("Request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Places text search returned HTTP {}", status);
            return Err(ThirdPlacesError::places_lookup(format!(
                "Places API returned HTTP {}",
                status
            )));
        }

        let body: TextSearchResponse = response.json().await.map_err(|e| {
            ThirdPlacesError::places_lookup(format!("Failed to parse response: {}", e.without_url()))
        })?;

        let candidates = parse_text_search(body)?;
        debug!("Places text search {:?}: {} candidates", query, candidates.len());
        Ok(candidates)
    }
}
