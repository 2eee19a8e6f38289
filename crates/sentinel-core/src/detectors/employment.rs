//! Employment-history detector.
//!
//! Looks for short tenures across many organizations, past membership of
//! known hostile groups, organizations that have since dissolved, and a current
//! membership that only just started.
//!
//! Hostility is resolved through a [`GroupDirectory`] the engine fills from
//! the data source's group lookup before detectors run, so the hostility
//! data source stays pluggable and this module stays pure.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sentinel_data::{AffiliationRecord, GroupId, GroupInfo};

use crate::detectors::{capped, DetectorOutput};
use crate::domain::{Flag, FlagCategory, Severity};

const HOPPING_MIN_RECORDS: usize = 3;
const HOPPING_FLAG_RECORDS: usize = 5;
const HOPPING_DEFINITE_RECORDS: usize = 10;
const HOPPING_MAX_MEAN_TENURE_DAYS: f64 = 90.0;
const HOSTILE_CONTRIBUTION: f64 = 60.0;
const RECENT_JOIN_DAYS: i64 = 8;
const EVIDENCE_LIMIT: usize = 3;

/// Groups resolved for one analysis, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupDirectory {
    groups: BTreeMap<GroupId, GroupInfo>,
}

impl GroupDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: GroupInfo) {
        self.groups.insert(group.id, group);
    }

    pub fn get(&self, id: GroupId) -> Option<&GroupInfo> {
        self.groups.get(&id)
    }

    /// The group, if it is known and marked hostile.
    pub fn hostile(&self, id: GroupId) -> Option<&GroupInfo> {
        self.get(id).filter(|g| g.hostile)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<GroupInfo> for GroupDirectory {
    fn from_iter<I: IntoIterator<Item = GroupInfo>>(iter: I) -> Self {
        let mut dir = Self::new();
        for group in iter {
            dir.insert(group);
        }
        dir
    }
}

/// Distinct group ids referenced by past (ended) memberships, ascending.
pub fn referenced_groups(affiliations: &[AffiliationRecord]) -> Vec<GroupId> {
    let mut ids: Vec<GroupId> = affiliations
        .iter()
        .filter(|a| !a.is_current())
        .filter_map(|a| a.group_id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// The current membership: no end date, latest start.
pub fn current_affiliation(affiliations: &[AffiliationRecord]) -> Option<&AffiliationRecord> {
    affiliations
        .iter()
        .filter(|a| a.is_current())
        .max_by_key(|a| a.start)
}

pub fn detect_employment_risk(
    affiliations: &[AffiliationRecord],
    groups: &GroupDirectory,
    now: DateTime<Utc>,
) -> DetectorOutput {
    let mut out = DetectorOutput::empty();
    if affiliations.is_empty() {
        return out;
    }

    if let Some(mean_days) = hopping_mean_tenure(affiliations) {
        let count = affiliations.len();
        let severity = if count > HOPPING_DEFINITE_RECORDS {
            Severity::Definite
        } else {
            Severity::Suspected
        };
        let flag = Flag::new(
            severity,
            FlagCategory::HistoryRisk,
            "Frequent organization changes",
            format!("Changed organizations {count} times, average tenure {mean_days:.0} days"),
            (count as f64 * 0.08).min(0.9),
        )
        .with_evidence([format!("{count} organizations in employment history")]);
        out.push(flag, capped(count, 5.0, 50.0));
    }

    let mut hostile: Vec<&GroupInfo> = Vec::new();
    for id in referenced_groups(affiliations) {
        if let Some(group) = groups.hostile(id) {
            hostile.push(group);
        }
    }
    if !hostile.is_empty() {
        let flag = Flag::definite(
            FlagCategory::HistoryRisk,
            "Employment in hostile group",
            format!("Previously employed in {} known hostile group(s)", hostile.len()),
            1.0,
        )
        .with_evidence(
            hostile
                .iter()
                .map(|g| format!("Employed in {} [{}]", g.name, g.ticker)),
        );
        out.push(flag, HOSTILE_CONTRIBUTION);
    }

    let dissolved: Vec<&AffiliationRecord> =
        affiliations.iter().filter(|a| a.dissolved).collect();
    if !dissolved.is_empty() {
        let flag = Flag::suspected(
            FlagCategory::HistoryRisk,
            "Employment in dissolved organizations",
            format!(
                "Employed in {} organization(s) that no longer exist",
                dissolved.len()
            ),
            0.6,
        )
        .with_evidence(
            dissolved
                .iter()
                .take(EVIDENCE_LIMIT)
                .map(|a| format!("{} (dissolved)", a.organization_name)),
        );
        out.push(flag, capped(dissolved.len(), 10.0, 30.0));
    }

    if let Some(current) = current_affiliation(affiliations) {
        let days = (now - current.start).num_days();
        if days < RECENT_JOIN_DAYS {
            let flag = Flag::suspected(
                FlagCategory::HistoryRisk,
                "Very recent organization join",
                format!(
                    "Joined {} only {} days ago",
                    current.organization_name,
                    days.max(0)
                ),
                0.5,
            )
            .with_evidence([format!("Current tenure: {} days", days.max(0))]);
            out.push(flag, 15.0);
        }
    }

    out.finish()
}

/// Mean tenure of ended memberships when the history looks like hopping.
fn hopping_mean_tenure(affiliations: &[AffiliationRecord]) -> Option<f64> {
    if affiliations.len() < HOPPING_MIN_RECORDS {
        return None;
    }
    let tenures: Vec<i64> = affiliations.iter().filter_map(|a| a.tenure_days()).collect();
    if tenures.is_empty() {
        return None;
    }
    let mean = tenures.iter().sum::<i64>() as f64 / tenures.len() as f64;
    (mean < HOPPING_MAX_MEAN_TENURE_DAYS && affiliations.len() >= HOPPING_FLAG_RECORDS)
        .then_some(mean)
}
