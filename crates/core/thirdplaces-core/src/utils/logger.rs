//! Logging setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the default log filter
pub const LOG_LEVEL_ENV: &str = "THIRDPLACES_LOG_LEVEL";

/// Filter used when neither `RUST_LOG` nor [`LOG_LEVEL_ENV`] is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn env_filter() -> EnvFilter {
    let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Initialize the global logging system
///
/// Logs go to stderr so stdout stays clean for results. Calling this more
/// than once is harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging();
        init_logging();
        tracing::info!("logging initialised");
    }
}
