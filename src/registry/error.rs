//! Relay error types
//!
//! Errors reported synchronously to producers by the ingestion path.

/// Error type for relay operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Topic identifier is not in the registry
    InvalidTopic(String),
    /// Nobody is subscribed, so the reading was not buffered
    NoSubscribers,
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::InvalidTopic(id) => write!(f, "Invalid topic: {}", id),
            RelayError::NoSubscribers => {
                write!(f, "No subscribers connected to receive the reading")
            }
        }
    }
}

impl std::error::Error for RelayError {}
