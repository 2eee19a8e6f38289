//! The assembled analysis report and its timeline entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sentinel_data::IdentityId;

use crate::domain::alt::AltCandidate;
use crate::domain::flag::Flag;
use crate::domain::score::RiskScore;
use crate::graph::AltNetwork;

/// Source of a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    AffiliationJoin,
    AffiliationLeave,
    LargeTransaction,
    AgreementFailed,
    Flag,
}

/// One event in the reconstructed chronology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: TimelineEventKind,
    pub description: String,
    pub risk_indicator: bool,
}

/// Complete risk assessment for one subject.
///
/// Built fresh per analysis; serializes to a plain nested structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub subject_id: IdentityId,
    pub subject_name: String,
    /// The injected analysis time, not a wall-clock read.
    pub generated_at: DateTime<Utc>,

    pub risk_score: RiskScore,

    pub definite_flags: Vec<Flag>,
    pub suspected_flags: Vec<Flag>,

    pub alt_candidates: Vec<AltCandidate>,
    /// Present only when at least one alt candidate exists.
    pub alt_network: Option<AltNetwork>,

    /// Most recent first.
    pub timeline: Vec<TimelineEntry>,

    pub questions: Vec<String>,
    pub notes: Vec<String>,

    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl AnalysisReport {
    /// All flags, definite first.
    pub fn all_flags(&self) -> impl Iterator<Item = &Flag> {
        self.definite_flags.iter().chain(self.suspected_flags.iter())
    }

    pub fn flag_count(&self) -> usize {
        self.definite_flags.len() + self.suspected_flags.len()
    }
}
