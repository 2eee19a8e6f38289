//! Domain-level error taxonomy for Sentinel.

use sentinel_data::{FetchError, Resource, ValidationError};

/// Sentinel engine errors.
#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    #[error("subject not found: {0}")]
    SubjectNotFound(u64),

    #[error("fetch of {resource} failed: {source}")]
    Fetch {
        resource: Resource,
        #[source]
        source: FetchError,
    },

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown flag category: {0}")]
    UnknownCategory(String),

    #[error("detector task failed: {0}")]
    DetectorTask(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SentinelError {
    /// Attach the resource being fetched to a data-layer error.
    pub fn fetch(resource: Resource) -> impl FnOnce(FetchError) -> Self {
        move |source| Self::Fetch { resource, source }
    }
}

/// Result type for Sentinel engine operations.
pub type Result<T> = std::result::Result<T, SentinelError>;
