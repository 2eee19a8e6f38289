//! Indirect-indicator detector ("spy" heuristics).

use chrono::{DateTime, Duration, Utc};
use sentinel_data::{AffiliationRecord, Identity, RelationshipKind, RelationshipRecord};

use crate::detectors::DetectorOutput;
use crate::domain::{Flag, FlagCategory};

/// Standing strictly below this is negative.
pub const NEGATIVE_STANDING: f64 = -2.0;
const RECENT_WINDOW_DAYS: i64 = 90;
const RECENT_CHANGES: usize = 3;
const ORGANIZATION_CONTACTS: usize = 3;
const ALLIANCE_CONTACTS: usize = 2;
const NEW_IDENTITY_DAYS: i64 = 30;

pub fn detect_indirect_indicators(
    identity: &Identity,
    affiliations: &[AffiliationRecord],
    relationships: &[RelationshipRecord],
    now: DateTime<Utc>,
) -> DetectorOutput {
    let mut out = DetectorOutput::empty();

    if identity.standing < NEGATIVE_STANDING {
        let flag = Flag::suspected(
            FlagCategory::SpyIndicator,
            "Negative standing",
            format!("Identity standing is {:.2}", identity.standing),
            0.4,
        )
        .with_evidence([format!("Standing: {:.2}", identity.standing)]);
        out.push(flag, 10.0);
    }

    let window_start = now - Duration::days(RECENT_WINDOW_DAYS);
    let recent = affiliations
        .iter()
        .filter(|a| a.start >= window_start)
        .count();
    if recent >= RECENT_CHANGES {
        let flag = Flag::suspected(
            FlagCategory::SpyIndicator,
            "Rapid recent organization changes",
            format!("{recent} organization changes in the last {RECENT_WINDOW_DAYS} days"),
            0.7,
        )
        .with_evidence([format!(
            "{recent} memberships started since {}",
            window_start.date_naive()
        )]);
        out.push(flag, 25.0);
    }

    let organizations = count_kind(relationships, RelationshipKind::Organization);
    let alliances = count_kind(relationships, RelationshipKind::Alliance);
    if organizations >= ORGANIZATION_CONTACTS || alliances >= ALLIANCE_CONTACTS {
        let flag = Flag::suspected(
            FlagCategory::SpyIndicator,
            "Multiple organization contacts",
            "Maintains standing with several organizations or alliances",
            0.5,
        )
        .with_evidence([
            format!("{organizations} organization contacts"),
            format!("{alliances} alliance contacts"),
        ]);
        out.push(flag, 15.0);
    }

    if let [only] = affiliations {
        let age = (now - only.start).num_days();
        if only.is_current() && age < NEW_IDENTITY_DAYS {
            let flag = Flag::suspected(
                FlagCategory::SpyIndicator,
                "Brand-new identity",
                format!("Single membership, started {} days ago", age.max(0)),
                0.6,
            )
            .with_evidence([format!("Only membership: {}", only.organization_name)]);
            out.push(flag, 20.0);
        }
    }

    out.finish()
}

fn count_kind(relationships: &[RelationshipRecord], kind: RelationshipKind) -> usize {
    relationships.iter().filter(|r| r.kind == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn identity(standing: f64) -> Identity {
        Identity {
            id: 1,
            name: "Subject".to_string(),
            organization_id: 10,
            organization_name: "Home".to_string(),
            group_id: None,
            group_name: None,
            standing,
        }
    }

    fn membership(days_ago: i64, ended_days_ago: Option<i64>) -> AffiliationRecord {
        AffiliationRecord {
            organization_id: 10 + days_ago as u64,
            organization_name: format!("Org {days_ago}"),
            start: now() - Duration::days(days_ago),
            end: ended_days_ago.map(|d| now() - Duration::days(d)),
            dissolved: false,
            group_id: None,
        }
    }

    fn contact(id: u64, kind: RelationshipKind) -> RelationshipRecord {
        RelationshipRecord {
            counterparty_id: id,
            counterparty_name: format!("Contact {id}"),
            kind,
            standing: 10.0,
        }
    }

    #[test]
    fn test_standing_boundary() {
        let at = detect_indirect_indicators(&identity(-2.0), &[], &[], now());
        assert!(at.flags.is_empty());
        assert_eq!(at.score, 0.0);

        let below = detect_indirect_indicators(&identity(-2.01), &[], &[], now());
        assert_eq!(below.flags.len(), 1);
        assert_eq!(below.flags[0].category, FlagCategory::SpyIndicator);
        assert_eq!(below.score, 10.0);
    }

    #[test]
    fn test_recent_changes_within_ninety_days() {
        let records = vec![
            membership(80, Some(60)),
            membership(60, Some(20)),
            membership(20, None),
            membership(400, Some(80)),
        ];
        let out = detect_indirect_indicators(&identity(0.0), &records, &[], now());
        assert_eq!(out.flags.len(), 1);
        assert_eq!(out.score, 25.0);

        let older = vec![membership(200, Some(60)), membership(60, Some(20)), membership(20, None)];
        assert!(detect_indirect_indicators(&identity(0.0), &older, &[], now())
            .flags
            .is_empty());
    }

    #[test]
    fn test_contact_spread() {
        let orgs: Vec<RelationshipRecord> = (0..3)
            .map(|i| contact(i, RelationshipKind::Organization))
            .collect();
        assert_eq!(detect_indirect_indicators(&identity(0.0), &[], &orgs, now()).score, 15.0);

        let alliances = vec![
            contact(1, RelationshipKind::Alliance),
            contact(2, RelationshipKind::Alliance),
        ];
        assert_eq!(
            detect_indirect_indicators(&identity(0.0), &[], &alliances, now()).score,
            15.0
        );

        let people: Vec<RelationshipRecord> =
            (0..10).map(|i| contact(i, RelationshipKind::Person)).collect();
        assert!(detect_indirect_indicators(&identity(0.0), &[], &people, now())
            .flags
            .is_empty());
    }

    #[test]
    fn test_brand_new_identity() {
        let fresh = detect_indirect_indicators(&identity(0.0), &[membership(29, None)], &[], now());
        assert_eq!(fresh.score, 20.0);
        assert_eq!(fresh.flags[0].title, "Brand-new identity");

        let older = detect_indirect_indicators(&identity(0.0), &[membership(30, None)], &[], now());
        assert!(older.flags.is_empty());

        let ended =
            detect_indirect_indicators(&identity(0.0), &[membership(10, Some(1))], &[], now());
        assert!(ended.flags.is_empty());
    }

    #[test]
    fn test_all_checks_fire_together() {
        let records = vec![membership(5, None)];
        let contacts = vec![
            contact(1, RelationshipKind::Alliance),
            contact(2, RelationshipKind::Alliance),
        ];
        let out = detect_indirect_indicators(&identity(-5.0), &records, &contacts, now());
        assert_eq!(out.flags.len(), 3);
        assert_eq!(out.score, 45.0);
    }
}
