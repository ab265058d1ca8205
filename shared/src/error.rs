//! Error types for the calendar notifier.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while formatting calendar events.
#[derive(Error, Debug)]
pub enum Error {
    /// Event payload is missing a required field or has an unparseable timestamp
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error was caused by the caller's payload rather than the deployment.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MalformedEvent(_))
    }
}
