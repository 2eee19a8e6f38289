//! Input record types for subject history.
//!
//! These are read-only to the engine. Every record implements [`Validate`]
//! so malformed numeric input is rejected once, at the boundary, instead of
//! being guarded ad hoc inside each detector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub type IdentityId = u64;
pub type OrganizationId = u64;
pub type GroupId = u64;

/// Boundary check applied to every fetched record.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Validate a slice of records, stopping at the first violation.
pub fn validate_all<T: Validate>(records: &[T]) -> Result<(), ValidationError> {
    records.iter().try_for_each(Validate::validate)
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Snapshot of the subject (or a name-search hit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub name: String,
    pub organization_id: OrganizationId,
    pub organization_name: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub group_name: Option<String>,
    /// Standing/reputation scalar; negative values are unfavourable.
    #[serde(default)]
    pub standing: f64,
}

impl Validate for Identity {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName { id: self.id });
        }
        if !self.standing.is_finite() {
            return Err(ValidationError::NonFiniteStanding { id: self.id });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Affiliations
// ---------------------------------------------------------------------------

/// One membership period in an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliationRecord {
    pub organization_id: OrganizationId,
    pub organization_name: String,
    pub start: DateTime<Utc>,
    /// `None` means the membership is current.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// The organization no longer exists.
    #[serde(default)]
    pub dissolved: bool,
    /// Group the organization belonged to during this membership.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl AffiliationRecord {
    pub fn is_current(&self) -> bool {
        self.end.is_none()
    }

    /// Whole days between start and end, if the membership has ended.
    pub fn tenure_days(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_days())
    }
}

impl Validate for AffiliationRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.end {
            Some(end) if end < self.start => Err(ValidationError::AffiliationTimeline {
                organization_id: self.organization_id,
            }),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Financial events
// ---------------------------------------------------------------------------

/// Ledger category of a financial event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialCategory {
    /// Direct transfer between two identities.
    PeerTransfer,
    /// Income generated by the system itself (bounties, rewards).
    SystemIncome,
    Market,
    Other,
}

impl std::fmt::Display for FinancialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PeerTransfer => write!(f, "peer_transfer"),
            Self::SystemIncome => write!(f, "system_income"),
            Self::Market => write!(f, "market"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A signed ledger entry: positive is inbound, negative is outbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialEvent {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub counterparty_id: IdentityId,
    pub amount: f64,
    pub category: FinancialCategory,
    #[serde(default)]
    pub note: Option<String>,
}

impl FinancialEvent {
    pub fn is_peer_transfer(&self) -> bool {
        self.category == FinancialCategory::PeerTransfer
    }

    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }
}

impl Validate for FinancialEvent {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount { id: self.id });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Agreements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementKind {
    Exchange,
    Courier,
    Auction,
}

impl std::fmt::Display for AgreementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exchange => write!(f, "exchange"),
            Self::Courier => write!(f, "courier"),
            Self::Auction => write!(f, "auction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    Outstanding,
    Completed,
    Failed,
    Voided,
}

impl AgreementStatus {
    /// Failed or voided: the agreement never settled.
    pub fn is_unsettled(self) -> bool {
        matches!(self, Self::Failed | Self::Voided)
    }
}

impl std::fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outstanding => write!(f, "outstanding"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Voided => write!(f, "voided"),
        }
    }
}

/// A contract between the subject and a counterparty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementRecord {
    pub id: u64,
    pub initiator_id: IdentityId,
    pub counterparty_id: IdentityId,
    pub issued: DateTime<Utc>,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: Option<DateTime<Utc>>,
    pub kind: AgreementKind,
    pub status: AgreementStatus,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub reward: f64,
    #[serde(default)]
    pub collateral: f64,
}

impl AgreementRecord {
    /// Combined value at stake: price + reward + collateral, saturating at
    /// `f64::MAX`.
    pub fn total_value(&self) -> f64 {
        (self.price + self.reward + self.collateral).min(f64::MAX)
    }
}

impl Validate for AgreementRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("price", self.price),
            ("reward", self.reward),
            ("collateral", self.collateral),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidAgreementValue {
                    id: self.id,
                    field,
                    value,
                });
            }
        }
        if matches!(self.completed, Some(done) if done < self.issued) {
            return Err(ValidationError::AgreementTimeline { id: self.id });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Relationships and groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Person,
    Organization,
    Alliance,
}

/// A social contact of the subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub counterparty_id: IdentityId,
    pub counterparty_name: String,
    pub kind: RelationshipKind,
    #[serde(default)]
    pub standing: f64,
}

impl Validate for RelationshipRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.standing.is_finite() {
            return Err(ValidationError::NonFiniteRelationshipStanding {
                id: self.counterparty_id,
            });
        }
        Ok(())
    }
}

/// Group (alliance-equivalent) directory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: GroupId,
    pub name: String,
    pub ticker: String,
    #[serde(default)]
    pub founded: Option<DateTime<Utc>>,
    /// Known hostile to the vetting organization.
    #[serde(default)]
    pub hostile: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn agreement() -> AgreementRecord {
        AgreementRecord {
            id: 7,
            initiator_id: 1,
            counterparty_id: 2,
            issued: ts(2),
            expires: None,
            completed: None,
            kind: AgreementKind::Courier,
            status: AgreementStatus::Outstanding,
            price: 0.0,
            reward: 1_000.0,
            collateral: 50_000.0,
        }
    }

    #[test]
    fn test_non_finite_amount_rejected() {
        let event = FinancialEvent {
            id: 3,
            timestamp: ts(1),
            counterparty_id: 9,
            amount: f64::NAN,
            category: FinancialCategory::PeerTransfer,
            note: None,
        };
        assert_eq!(
            event.validate(),
            Err(ValidationError::NonFiniteAmount { id: 3 })
        );
    }

    #[test]
    fn test_negative_collateral_rejected() {
        let mut a = agreement();
        a.collateral = -1.0;
        let err = a.validate().unwrap_err();
        assert!(err.to_string().contains("collateral"));
    }

    #[test]
    fn test_agreement_completed_before_issue_rejected() {
        let mut a = agreement();
        a.completed = Some(ts(1));
        assert_eq!(
            a.validate(),
            Err(ValidationError::AgreementTimeline { id: 7 })
        );
        assert_eq!(a.total_value(), 51_000.0);
    }

    #[test]
    fn test_total_value_saturates() {
        let mut a = agreement();
        a.price = f64::MAX;
        a.collateral = f64::MAX;
        a.validate().unwrap();
        assert_eq!(a.total_value(), f64::MAX);
    }

    #[test]
    fn test_affiliation_tenure_and_ordering() {
        let ok = AffiliationRecord {
            organization_id: 10,
            organization_name: "Corp".to_string(),
            start: ts(1),
            end: Some(ts(11)),
            dissolved: false,
            group_id: None,
        };
        assert_eq!(ok.tenure_days(), Some(10));
        assert!(ok.validate().is_ok());

        let bad = AffiliationRecord {
            start: ts(11),
            end: Some(ts(1)),
            ..ok
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_all_stops_at_first_violation() {
        let mut bad = agreement();
        bad.id = 8;
        bad.price = f64::INFINITY;
        let err = validate_all(&[agreement(), bad]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidAgreementValue { id: 8, .. }
        ));
    }

    #[test]
    fn test_category_serde_is_snake_case() {
        let json = serde_json::to_string(&FinancialCategory::PeerTransfer).unwrap();
        assert_eq!(json, "\"peer_transfer\"");
        let back: AgreementStatus = serde_json::from_str("\"voided\"").unwrap();
        assert!(back.is_unsettled());
    }
}
