//! Third Places terminal shell
//!
//! Prints places, search results and alerts to the terminal with secrets
//! redacted, and feeds typed lines back to the caller.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod redact;
pub mod render;

pub use redact::Redactor;

use thirdplaces_core::{
    PlaceCandidate, PlaceId, PlaceRecord, RankedResult, Result, SavedPlaces, UserAlert,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Terminal output settings
#[derive(Debug, Clone, Default)]
pub struct TerminalConfig {
    /// Print place descriptions under each entry
    pub show_descriptions: bool,
}

/// Writes rendered output to stdout and alerts to stderr
pub struct TerminalAdaptor {
    /// Output settings
    pub config: TerminalConfig,
    redactor: Redactor,
}

impl TerminalAdaptor {
    /// Create an adaptor
    pub fn new(config: TerminalConfig) -> Result<Self> {
        Ok(Self {
            config,
            redactor: Redactor::new()?,
        })
    }

    fn out(&self, text: &str) {
        print!("{}", self.redactor.redact(text));
    }

    /// Print one line of status text
    pub fn info(&self, line: &str) {
        self.out(&format!("{}\n", line));
    }

    /// Print ranked search results
    pub fn show_results(&self, query: &str, results: &[RankedResult]) {
        self.out(&render::render_results(
            query,
            results,
            self.config.show_descriptions,
        ));
    }

    /// Print feed entries
    pub fn show_places<F>(&self, places: &[&PlaceRecord], is_liked: F)
    where
        F: Fn(PlaceId) -> bool,
    {
        self.out(&render::render_places(
            places,
            is_liked,
            self.config.show_descriptions,
        ));
    }

    /// Print saved places
    pub fn show_saved(&self, saved: &SavedPlaces) {
        self.out(&render::render_saved(saved));
    }

    /// Print lookup candidates
    pub fn show_candidates(&self, candidates: &[PlaceCandidate]) {
        self.out(&render::render_candidates(candidates));
    }

    /// Print an alert to stderr
    pub fn show_alert(&self, alert: &UserAlert) {
        eprint!("{}", self.redactor.redact(&render::render_alert(alert)));
    }
}

/// Read stdin line by line on a background task
///
/// The channel closes at end of input.
pub fn spawn_line_reader() -> (JoinHandle<()>, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("stdin closed: {}", e);
                    break;
                }
            }
        }
    });
    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptor_creation() {
        let adaptor = TerminalAdaptor::new(TerminalConfig {
            show_descriptions: true,
        })
        .unwrap();
        assert!(adaptor.config.show_descriptions);
    }
}
