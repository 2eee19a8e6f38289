//! Sentinel-Data: Subject History Records and Retrieval
//!
//! This crate owns the input side of the Sentinel risk engine: the record
//! types describing a subject's behavioral history, the boundary validation
//! those records must pass, and the async [`DataSource`] capability the
//! engine fetches them through.
//!
//! ## Layer 0 - Data/Retrieval
//!
//! Focus: well-formed, read-only snapshots of subject history.
//!
//! ## Key Components
//!
//! - `DataSource`: async retrieval capability (identity, history, lookups)
//! - `Validate`: boundary checks that reject malformed numeric input
//! - `MemoryDataSource`: in-memory backend, loadable from a JSON dataset

mod error;
pub mod fakes;
pub mod records;
pub mod source;

pub use error::{FetchError, FetchResult, ValidationError};
pub use fakes::{Dataset, MemoryDataSource, SubjectHistory};
pub use records::{
    validate_all, AffiliationRecord, AgreementKind, AgreementRecord, AgreementStatus,
    FinancialCategory, FinancialEvent, GroupId, GroupInfo, Identity, IdentityId, OrganizationId,
    RelationshipKind, RelationshipRecord, Validate,
};
pub use source::{DataSource, Resource};
