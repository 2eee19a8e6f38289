//! Retrieval capability definitions for Sentinel
//!
//! The engine consumes subject history exclusively through [`DataSource`].
//! All methods are async and backend-agnostic; an in-memory implementation
//! is provided for tests and fixtures via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;
use crate::records::{
    AffiliationRecord, AgreementRecord, FinancialEvent, GroupId, GroupInfo, Identity, IdentityId,
    RelationshipRecord,
};

/// The mandatory and auxiliary resources a data source serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Identity,
    Affiliations,
    FinancialEvents,
    Agreements,
    Relationships,
    Groups,
    NameSearch,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::Affiliations => write!(f, "affiliations"),
            Self::FinancialEvents => write!(f, "financial_events"),
            Self::Agreements => write!(f, "agreements"),
            Self::Relationships => write!(f, "relationships"),
            Self::Groups => write!(f, "groups"),
            Self::NameSearch => write!(f, "name_search"),
        }
    }
}

/// Subject history retrieval capability.
///
/// Guarantees expected by the engine:
/// - `identity` returns `Ok(None)` for an unknown subject, never an error.
/// - List methods may return records in any order.
/// - `limit` caps the number of records returned (most recent first is
///   recommended but not required).
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Identity record for the subject, or `None` if unknown.
    async fn identity(&self, subject: IdentityId) -> FetchResult<Option<Identity>>;

    /// Affiliation history (ordered or unordered).
    async fn affiliations(&self, subject: IdentityId) -> FetchResult<Vec<AffiliationRecord>>;

    /// Financial events, optionally capped.
    async fn financial_events(
        &self,
        subject: IdentityId,
        limit: Option<usize>,
    ) -> FetchResult<Vec<FinancialEvent>>;

    /// Agreement records, optionally capped.
    async fn agreements(
        &self,
        subject: IdentityId,
        limit: Option<usize>,
    ) -> FetchResult<Vec<AgreementRecord>>;

    /// Social relationships of the subject.
    async fn relationships(&self, subject: IdentityId) -> FetchResult<Vec<RelationshipRecord>>;

    /// Resolve a group by id (hostility lookup). `None` if unknown.
    async fn group(&self, group: GroupId) -> FetchResult<Option<GroupInfo>>;

    /// Identities whose display name contains `fragment` (case-insensitive).
    async fn search_identities(&self, fragment: &str) -> FetchResult<Vec<Identity>>;
}
