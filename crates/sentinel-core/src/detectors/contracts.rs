//! Contract-pattern detector.

use sentinel_data::{AgreementKind, AgreementRecord};

use crate::detectors::{capped, format_units, DetectorOutput};
use crate::domain::{Flag, FlagCategory};

/// Combined value above which an unsettled agreement is suspicious.
pub const FAILED_HIGH_VALUE_THRESHOLD: f64 = 100_000_000.0;
const COURIER_MAX_COLLATERAL_RATIO: f64 = 50.0;
const CHURN_MIN_AGREEMENTS: usize = 10;
const CHURN_MAX_PER_DAY: f64 = 5.0;
const EVIDENCE_LIMIT: usize = 3;

pub fn detect_contract_patterns(agreements: &[AgreementRecord]) -> DetectorOutput {
    let mut out = DetectorOutput::empty();
    if agreements.is_empty() {
        return out;
    }

    let failed: Vec<&AgreementRecord> = agreements
        .iter()
        .filter(|a| a.status.is_unsettled() && a.total_value() > FAILED_HIGH_VALUE_THRESHOLD)
        .collect();
    if !failed.is_empty() {
        let flag = Flag::suspected(
            FlagCategory::SuspiciousContracts,
            "High-value failed agreements",
            format!("Found {} high-value agreements that failed", failed.len()),
            0.6,
        )
        .with_evidence(failed.iter().take(EVIDENCE_LIMIT).map(|a| {
            format!(
                "{} agreement for {} units {}",
                a.kind,
                format_units(a.total_value()),
                a.status
            )
        }));
        out.push(flag, capped(failed.len(), 15.0, 35.0));
    }

    let lopsided: Vec<&AgreementRecord> = agreements
        .iter()
        .filter(|a| {
            a.kind == AgreementKind::Courier
                && a.collateral > 0.0
                && a.reward > 0.0
                && a.collateral / a.reward > COURIER_MAX_COLLATERAL_RATIO
        })
        .collect();
    if !lopsided.is_empty() {
        let flag = Flag::suspected(
            FlagCategory::SuspiciousContracts,
            "Unusual courier agreements",
            format!(
                "Found {} courier agreements with suspicious collateral/reward ratios",
                lopsided.len()
            ),
            0.7,
        )
        .with_evidence(lopsided.iter().take(EVIDENCE_LIMIT).map(|a| {
            format!(
                "Collateral {} units, reward {} units",
                format_units(a.collateral),
                format_units(a.reward)
            )
        }));
        out.push(flag, capped(lopsided.len(), 10.0, 25.0));
    }

    if let Some((span_days, rate)) = churn_rate(agreements) {
        let flag = Flag::suspected(
            FlagCategory::SuspiciousContracts,
            "Agreement churning detected",
            format!("Unusually high agreement activity: {rate:.1} agreements/day"),
            0.65,
        )
        .with_evidence([
            format!("{} agreements over {span_days} days", agreements.len()),
            format!("Average {rate:.1} agreements per day"),
        ]);
        out.push(flag, 20.0);
    }

    out.finish()
}

/// `(span_days, agreements_per_day)` when the issue rate exceeds the churn
/// threshold. Needs at least ten agreements spanning at least one whole day.
fn churn_rate(agreements: &[AgreementRecord]) -> Option<(i64, f64)> {
    if agreements.len() < CHURN_MIN_AGREEMENTS {
        return None;
    }
    let first = agreements.iter().map(|a| a.issued).min()?;
    let last = agreements.iter().map(|a| a.issued).max()?;
    let span_days = (last - first).num_days();
    if span_days <= 0 {
        return None;
    }
    let rate = agreements.len() as f64 / span_days as f64;
    (rate > CHURN_MAX_PER_DAY).then_some((span_days, rate))
}
