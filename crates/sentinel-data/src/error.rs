//! Error types for sentinel-data

use thiserror::Error;

use crate::source::Resource;

/// Result type for retrieval operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Boundary violations found while validating input records.
///
/// Detectors never see a record that fails one of these checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("identity {id} has an empty display name")]
    EmptyName { id: u64 },

    #[error("identity {id} has non-finite standing")]
    NonFiniteStanding { id: u64 },

    #[error("financial event {id} has non-finite amount")]
    NonFiniteAmount { id: u64 },

    #[error("agreement {id} has invalid {field}: {value}")]
    InvalidAgreementValue {
        id: u64,
        field: &'static str,
        value: f64,
    },

    #[error("agreement {id} completes before it was issued")]
    AgreementTimeline { id: u64 },

    #[error("affiliation with organization {organization_id} ends before it starts")]
    AffiliationTimeline { organization_id: u64 },

    #[error("relationship with {id} has non-finite standing")]
    NonFiniteRelationshipStanding { id: u64 },
}

/// Errors that can occur while retrieving subject history
#[derive(Error, Debug)]
pub enum FetchError {
    /// Backend query failed
    #[error("backend query failed: {0}")]
    Backend(String),

    /// Resource could not be served at all
    #[error("{resource} unavailable")]
    Unavailable { resource: Resource },

    /// Dataset could not be decoded
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A fetched record failed boundary validation
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Serialization(err.to_string())
    }
}
