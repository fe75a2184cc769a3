//! User-visible alerts

use crate::ThirdPlacesError;
use serde::Serialize;
use std::fmt;

/// A transient message for the user, raised when an error is recovered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAlert {
    /// Short title
    pub title: String,
    /// Human-readable detail
    pub message: String,
}

impl UserAlert {
    /// Create an alert
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Alert for an error, with an optional prefix for the message
    pub fn from_error(prefix: Option<&str>, error: &ThirdPlacesError) -> Self {
        let message = match prefix {
            Some(prefix) => format!("{}: {}", prefix, error),
            None => error.to_string(),
        };
        Self::new(error.alert_title(), message)
    }
}

impl fmt::Display for UserAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
