//! Chronological reconstruction of notable subject events.

use chrono::{DateTime, Utc};
use sentinel_data::{AffiliationRecord, AgreementRecord, FinancialEvent};

use crate::detectors::{format_units, running_mean};
use crate::domain::{Flag, TimelineEntry, TimelineEventKind};

/// Events above this multiple of the mean magnitude are "large".
const LARGE_TRANSACTION_MULTIPLE: f64 = 3.0;
/// Unsettled agreements above this combined value appear on the timeline.
pub const FAILED_AGREEMENT_TIMELINE_THRESHOLD: f64 = 50_000_000.0;

/// Merge affiliation changes, large transactions, failed high-value
/// agreements and definite flags into one timeline, most recent first.
///
/// Flag entries carry `generated_at` because flags have no event time of
/// their own. Entries are not deduplicated across sources; equal
/// timestamps keep source order.
pub fn reconstruct_timeline(
    affiliations: &[AffiliationRecord],
    events: &[FinancialEvent],
    agreements: &[AgreementRecord],
    flags: &[Flag],
    generated_at: DateTime<Utc>,
) -> Vec<TimelineEntry> {
    let mut timeline = Vec::new();

    for record in affiliations {
        timeline.push(TimelineEntry {
            timestamp: record.start,
            kind: TimelineEventKind::AffiliationJoin,
            description: format!("Joined {}", record.organization_name),
            risk_indicator: false,
        });
        if let Some(end) = record.end {
            timeline.push(TimelineEntry {
                timestamp: end,
                kind: TimelineEventKind::AffiliationLeave,
                description: format!("Left {}", record.organization_name),
                risk_indicator: record.dissolved,
            });
        }
    }

    if let Some(mean) = running_mean(events.iter().map(FinancialEvent::magnitude)) {
        let threshold = mean * LARGE_TRANSACTION_MULTIPLE;
        for event in events.iter().filter(|e| e.magnitude() > threshold) {
            timeline.push(TimelineEntry {
                timestamp: event.timestamp,
                kind: TimelineEventKind::LargeTransaction,
                description: format!(
                    "Large transaction: {} units ({})",
                    format_units(event.amount),
                    event.category
                ),
                risk_indicator: event.is_peer_transfer(),
            });
        }
    }

    for agreement in agreements {
        let value = agreement.total_value();
        if agreement.status.is_unsettled() && value > FAILED_AGREEMENT_TIMELINE_THRESHOLD {
            timeline.push(TimelineEntry {
                timestamp: agreement.issued,
                kind: TimelineEventKind::AgreementFailed,
                description: format!(
                    "Failed {} agreement ({} units)",
                    agreement.kind,
                    format_units(value)
                ),
                risk_indicator: true,
            });
        }
    }

    for flag in flags.iter().filter(|f| f.is_definite()) {
        timeline.push(TimelineEntry {
            timestamp: generated_at,
            kind: TimelineEventKind::Flag,
            description: format!("RISK FLAG: {}", flag.title),
            risk_indicator: true,
        });
    }

    timeline.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FlagCategory;
    use chrono::{Duration, TimeZone};
    use sentinel_data::{AgreementKind, AgreementStatus, FinancialCategory};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn event(id: u64, n: i64, amount: f64, category: FinancialCategory) -> FinancialEvent {
        FinancialEvent {
            id,
            timestamp: day(n),
            counterparty_id: 42,
            amount,
            category,
            note: None,
        }
    }

    #[test]
    fn test_empty_inputs_give_empty_timeline() {
        assert!(reconstruct_timeline(&[], &[], &[], &[], day(0)).is_empty());
    }

    #[test]
    fn test_affiliations_produce_join_and_leave() {
        let records = vec![
            AffiliationRecord {
                organization_id: 1,
                organization_name: "Old Corp".to_string(),
                start: day(0),
                end: Some(day(30)),
                dissolved: true,
                group_id: None,
            },
            AffiliationRecord {
                organization_id: 2,
                organization_name: "New Corp".to_string(),
                start: day(30),
                end: None,
                dissolved: false,
                group_id: None,
            },
        ];
        let timeline = reconstruct_timeline(&records, &[], &[], &[], day(100));
        let described: Vec<(&str, bool)> = timeline
            .iter()
            .map(|e| (e.description.as_str(), e.risk_indicator))
            .collect();
        // Same-day leave and join keep source order.
        assert_eq!(
            described,
            vec![
                ("Left Old Corp", true),
                ("Joined New Corp", false),
                ("Joined Old Corp", false),
            ]
        );
    }

    #[test]
    fn test_large_transactions_marked_by_category() {
        let mut events: Vec<FinancialEvent> = (0..8)
            .map(|i| event(i, i as i64, 100.0, FinancialCategory::SystemIncome))
            .collect();
        events.push(event(20, 10, -5_000.0, FinancialCategory::PeerTransfer));
        events.push(event(21, 11, 5_000.0, FinancialCategory::Market));

        let timeline = reconstruct_timeline(&[], &events, &[], &[], day(20));
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].kind, TimelineEventKind::LargeTransaction);
        assert!(!timeline[0].risk_indicator);
        assert!(timeline[1].risk_indicator);
        assert_eq!(timeline[1].description, "Large transaction: -5,000 units (peer_transfer)");
    }

    #[test]
    fn test_failed_agreements_over_fifty_million() {
        let agreement = |id: u64, status: AgreementStatus, price: f64| AgreementRecord {
            id,
            initiator_id: 1,
            counterparty_id: 2,
            issued: day(id as i64),
            expires: None,
            completed: None,
            kind: AgreementKind::Exchange,
            status,
            price,
            reward: 0.0,
            collateral: 0.0,
        };
        let agreements = vec![
            agreement(1, AgreementStatus::Failed, 60_000_000.0),
            agreement(2, AgreementStatus::Completed, 90_000_000.0),
            agreement(3, AgreementStatus::Voided, 50_000_000.0),
        ];
        let timeline = reconstruct_timeline(&[], &[], &agreements, &[], day(10));
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].description, "Failed exchange agreement (60,000,000 units)");
        assert!(timeline[0].risk_indicator);
    }

    #[test]
    fn test_definite_flags_stamped_at_generation_time() {
        let flags = vec![
            Flag::definite(FlagCategory::HistoryRisk, "Employment in hostile group", "d", 1.0),
            Flag::suspected(FlagCategory::SpyIndicator, "Negative standing", "d", 0.4),
        ];
        let records = vec![AffiliationRecord {
            organization_id: 1,
            organization_name: "Corp".to_string(),
            start: day(0),
            end: None,
            dissolved: false,
            group_id: None,
        }];
        let timeline = reconstruct_timeline(&records, &[], &[], &flags, day(50));
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].timestamp, day(50));
        assert_eq!(timeline[0].description, "RISK FLAG: Employment in hostile group");
        assert_eq!(timeline[1].kind, TimelineEventKind::AffiliationJoin);
    }
}
