//! Financial-pattern detector (money-laundering heuristics).
//!
//! Three independent checks over the subject's ledger, each evaluated on a
//! private chronologically sorted copy of the input:
//!
//! - **Round-trips**: inbound funds sent back out within 24 hours at a
//!   near-identical amount.
//! - **Structuring**: a day with many peer transfers of suspiciously
//!   uniform size.
//! - **Outliers**: peer transfers far above the subject's mean.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sentinel_data::FinancialEvent;

use crate::detectors::{capped, format_units, running_mean, DetectorOutput};
use crate::domain::{Flag, FlagCategory};

const ROUND_TRIP_WINDOW_EVENTS: usize = 10;
const ROUND_TRIP_WINDOW_HOURS: f64 = 24.0;
const ROUND_TRIP_TOLERANCE: f64 = 0.1;

const STRUCTURING_MIN_EVENTS: usize = 5;
const STRUCTURING_MAX_CV: f64 = 0.3;

const OUTLIER_MIN_EVENTS: usize = 5;
const OUTLIER_MULTIPLE: f64 = 5.0;

const EVIDENCE_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
struct RoundTrip {
    inbound: f64,
    outbound: f64,
    hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct SuspiciousDay {
    day: NaiveDate,
    count: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct Outlier {
    amount: f64,
    times_mean: f64,
}

/// Run all financial checks. The caller's slice is never reordered.
pub fn detect_financial_patterns(events: &[FinancialEvent]) -> DetectorOutput {
    let mut out = DetectorOutput::empty();
    if events.is_empty() {
        return out;
    }

    let mut sorted: Vec<&FinancialEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let round_trips = find_round_trips(&sorted);
    if !round_trips.is_empty() {
        let n = round_trips.len();
        let flag = Flag::suspected(
            FlagCategory::MoneyLaundering,
            "Round-trip transfers detected",
            format!("Found {n} instances of funds being received and then sent out rapidly"),
            (n as f64 * 0.2).min(0.9),
        )
        .with_evidence(round_trips.iter().take(EVIDENCE_LIMIT).map(|rt| {
            format!(
                "{} units in, {} units out within {:.1} hours",
                format_units(rt.inbound),
                format_units(rt.outbound),
                rt.hours
            )
        }));
        out.push(flag, capped(n, 15.0, 40.0));
    }

    let days = find_structuring(&sorted);
    if !days.is_empty() {
        let total: usize = days.iter().map(|d| d.count).sum();
        let flag = Flag::suspected(
            FlagCategory::MoneyLaundering,
            "Possible structuring detected",
            format!("Multiple similarly sized peer transfers ({total}) concentrated on single days"),
            (days.len() as f64 * 0.25).min(0.85),
        )
        .with_evidence(
            days.iter()
                .take(EVIDENCE_LIMIT)
                .map(|d| format!("{} similar transactions on {}", d.count, d.day)),
        );
        out.push(flag, 25.0);
    }

    let outliers = find_outliers(&sorted);
    if !outliers.is_empty() {
        let n = outliers.len();
        let flag = Flag::suspected(
            FlagCategory::MoneyLaundering,
            "Unusually large transactions",
            format!("Found {n} transactions significantly above average"),
            0.5,
        )
        .with_evidence(outliers.iter().take(EVIDENCE_LIMIT).map(|o| {
            format!(
                "{} units ({:.1}x average)",
                format_units(o.amount),
                o.times_mean
            )
        }));
        out.push(flag, capped(n, 10.0, 30.0));
    }

    out.finish()
}

/// Each inbound event matched to the first qualifying outbound event among
/// the next [`ROUND_TRIP_WINDOW_EVENTS`] events.
fn find_round_trips(sorted: &[&FinancialEvent]) -> Vec<RoundTrip> {
    let mut found = Vec::new();
    for (i, inbound) in sorted.iter().enumerate() {
        if inbound.amount <= 0.0 {
            continue;
        }
        let window_end = (i + 1 + ROUND_TRIP_WINDOW_EVENTS).min(sorted.len());
        for outbound in &sorted[i + 1..window_end] {
            if outbound.amount >= 0.0 {
                continue;
            }
            let hours = (outbound.timestamp - inbound.timestamp).num_seconds() as f64 / 3600.0;
            if hours > ROUND_TRIP_WINDOW_HOURS {
                break;
            }
            if (inbound.amount + outbound.amount).abs() / inbound.amount < ROUND_TRIP_TOLERANCE {
                found.push(RoundTrip {
                    inbound: inbound.amount,
                    outbound: outbound.amount.abs(),
                    hours,
                });
                break;
            }
        }
    }
    found
}

/// UTC days with at least five peer transfers whose coefficient of
/// variation is below [`STRUCTURING_MAX_CV`].
fn find_structuring(sorted: &[&FinancialEvent]) -> Vec<SuspiciousDay> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for event in sorted.iter().filter(|e| e.is_peer_transfer()) {
        by_day
            .entry(event.timestamp.date_naive())
            .or_default()
            .push(event.magnitude());
    }

    by_day
        .into_iter()
        .filter(|(_, amounts)| amounts.len() >= STRUCTURING_MIN_EVENTS)
        .filter_map(|(day, amounts)| {
            let cv = coefficient_of_variation(&amounts)?;
            (cv < STRUCTURING_MAX_CV).then_some(SuspiciousDay {
                day,
                count: amounts.len(),
            })
        })
        .collect()
}

/// Population standard deviation over mean; `None` when the mean is zero.
///
/// Values are scaled by their maximum first; the ratio is scale-invariant
/// and the squared deviations stay in [0, 1].
fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let scale = values.iter().copied().fold(0.0_f64, f64::max);
    if scale <= 0.0 {
        return None;
    }
    let mean = running_mean(values.iter().map(|v| v / scale))?;
    let variance = running_mean(values.iter().map(|v| (v / scale - mean).powi(2)))?;
    Some(variance.sqrt() / mean)
}

fn find_outliers(sorted: &[&FinancialEvent]) -> Vec<Outlier> {
    let peer: Vec<f64> = sorted
        .iter()
        .filter(|e| e.is_peer_transfer())
        .map(|e| e.magnitude())
        .collect();
    if peer.len() < OUTLIER_MIN_EVENTS {
        return Vec::new();
    }
    let mean = match running_mean(peer.iter().copied()) {
        Some(mean) if mean > 0.0 => mean,
        _ => return Vec::new(),
    };
    let threshold = mean * OUTLIER_MULTIPLE;
    peer.into_iter()
        .filter(|amount| *amount > threshold)
        .map(|amount| Outlier {
            amount,
            times_mean: amount / mean,
        })
        .collect()
}
