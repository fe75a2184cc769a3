//! Configuration management and environment variable loading

use crate::{Result, ThirdPlacesError};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Read `.env` from the working directory or the nearest parent
///
/// Having no `.env` at all is fine; settings then come from the process
/// environment. A file that exists but cannot be read or parsed is a
/// [`ThirdPlacesError::Config`].
///
/// ```no_run
/// thirdplaces_core::load_env()?;
/// # Ok::<(), thirdplaces_core::ThirdPlacesError>(())
/// ```
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(found) => {
            tracing::info!("Using settings from {}", found.display());
            Ok(())
        }
        Err(e) if e.not_found() => {
            tracing::debug!("No .env file, reading settings from the process environment");
            Ok(())
        }
        Err(e) => Err(env_file_error(".env", e)),
    }
}

/// Read settings from an explicit file, which must exist
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    dotenvy::from_path(path).map_err(|e| env_file_error(&path.display().to_string(), e))?;
    tracing::info!("Using settings from {}", path.display());
    Ok(())
}

fn env_file_error(source: &str, e: dotenvy::Error) -> ThirdPlacesError {
    match e {
        dotenvy::Error::LineParse(line, column) => ThirdPlacesError::config(format!(
            "{}: cannot parse `{}` (column {})",
            source, line, column
        )),
        other => ThirdPlacesError::config(format!("{}: {}", source, other)),
    }
}

/// Get required environment variable
///
/// Returns an error if the variable is not set or blank
pub fn get_required_env(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ThirdPlacesError::config(format!(
            "Required environment variable '{}' is not set. \
             Check your .env file or system environment.",
            key
        ))),
    }
}

/// Get optional environment variable, treating blank values as unset
pub fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get environment variable as integer
pub fn get_env_int<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Get environment variable as float
pub fn get_env_float(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(default)
}

/// Optional request timeout shared by the HTTP clients (`HTTP_TIMEOUT_SECS`)
pub fn http_timeout() -> Option<Duration> {
    get_optional_env("HTTP_TIMEOUT_SECS")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Semantic search settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of results
    pub top_k: usize,
    /// Queries shorter than this (after trimming) are not searched
    pub min_query_chars: usize,
    /// Quiet period before a debounced query runs
    pub debounce: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_query_chars: 3,
            debounce: Duration::from_millis(500),
        }
    }
}

impl SearchConfig {
    /// Read `SEARCH_TOP_K`, `SEARCH_MIN_QUERY_CHARS` and `SEARCH_DEBOUNCE_MS`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            top_k: get_env_int("SEARCH_TOP_K", defaults.top_k),
            min_query_chars: get_env_int("SEARCH_MIN_QUERY_CHARS", defaults.min_query_chars),
            debounce: Duration::from_millis(get_env_int(
                "SEARCH_DEBOUNCE_MS",
                defaults.debounce.as_millis() as u64,
            )),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make search return nothing
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(ThirdPlacesError::config("SEARCH_TOP_K must be at least 1"));
        }
        if self.min_query_chars == 0 {
            return Err(ThirdPlacesError::config(
                "SEARCH_MIN_QUERY_CHARS must be at least 1",
            ));
        }
        Ok(())
    }
}
