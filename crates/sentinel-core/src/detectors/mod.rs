//! Independent pattern detectors.
//!
//! Every detector is a pure function of an immutable slice of subject
//! history (plus an explicit `now` where recency matters). None observes
//! another's output, so they may run in any order or concurrently.
//!
//! - `alt_linker`: probable alternate identities
//! - `financial`: round-trips, structuring, outlier transfers
//! - `contracts`: failed high-value, lopsided courier, churn
//! - `employment`: hopping, hostile groups, dissolved orgs, recent join
//! - `indirect`: standing, recent churn, contact spread, brand-new identity

pub mod alt_linker;
pub mod contracts;
pub mod employment;
pub mod financial;
pub mod indirect;

use serde::{Deserialize, Serialize};

use crate::domain::{clamp_score, Flag};

pub use alt_linker::{link_alts, name_search_prefix, names_similar};
pub use contracts::detect_contract_patterns;
pub use employment::{detect_employment_risk, GroupDirectory};
pub use financial::detect_financial_patterns;
pub use indirect::detect_indirect_indicators;

/// Which detector produced an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    AltLinker,
    Financial,
    Contracts,
    Employment,
    Indirect,
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AltLinker => write!(f, "alt_linker"),
            Self::Financial => write!(f, "financial"),
            Self::Contracts => write!(f, "contracts"),
            Self::Employment => write!(f, "employment"),
            Self::Indirect => write!(f, "indirect"),
        }
    }
}

/// Flags raised by one detector plus its sub-score in [0, 100].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorOutput {
    pub flags: Vec<Flag>,
    pub score: f64,
}

impl DetectorOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record a flag together with its score contribution.
    pub(crate) fn push(&mut self, flag: Flag, contribution: f64) {
        self.flags.push(flag);
        self.score += contribution;
    }

    /// Apply the sub-score cap.
    pub(crate) fn finish(mut self) -> Self {
        self.score = clamp_score(self.score);
        self
    }
}

/// Capped per-item contribution: `min(count × each, cap)`.
pub(crate) fn capped(count: usize, each: f64, cap: f64) -> f64 {
    (count as f64 * each).min(cap)
}

/// Arithmetic mean computed incrementally, so finite inputs near
/// `f64::MAX` never overflow to infinity. `None` for no values.
pub(crate) fn running_mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut mean = 0.0;
    let mut count = 0usize;
    for value in values {
        count += 1;
        mean += (value - mean) / count as f64;
    }
    (count > 0).then_some(mean)
}

/// Render a monetary amount with thousands separators and no decimals.
pub fn format_units(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative {
        format!("-{out}")
    } else {
        out
    }
}
