//! Error types for the discovery bridge.

use thiserror::Error;

/// Errors that can occur while turning announces into discovery documents.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid announce message: {0}")]
    InvalidAnnounce(#[source] serde_json::Error),

    #[error("Failed to serialize discovery document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Publish failed on {topic}: {reason}")]
    Publish { topic: String, reason: String },

    #[error("Subscribe failed: {0}")]
    Subscribe(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
