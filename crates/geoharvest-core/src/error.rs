//! Error types for GeoHarvest

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    // Network errors
    #[error("Network error on attempt {attempt}: {reason}")]
    Network { attempt: u32, reason: String },

    #[error("Request timed out after {timeout_ms}ms on attempt {attempt}")]
    Timeout { attempt: u32, timeout_ms: u64 },

    #[error("HTTP error on attempt {attempt}: {status} {reason}")]
    Http {
        attempt: u32,
        status: u16,
        reason: String,
    },

    #[error("HTTP client setup failed: {reason}")]
    Client { reason: String },

    // Payload errors
    #[error("Response is not valid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response schema: {reason}")]
    Schema { reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Sink errors
    #[error("Failed to submit feature collection: {reason}")]
    Sink { reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl HarvestError {
    /// Whether another fetch attempt may succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HarvestError::Network { .. } | HarvestError::Timeout { .. } | HarvestError::Http { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
