//! Evidence-backed risk flags.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::SentinelError;

/// Severity tier of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Conclusive red flag.
    Definite,
    /// Suspicious but not conclusive.
    Suspected,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Definite => write!(f, "definite"),
            Self::Suspected => write!(f, "suspected"),
        }
    }
}

/// Category of the detector finding behind a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagCategory {
    MoneyLaundering,
    SuspiciousContracts,
    HistoryRisk,
    SpyIndicator,
}

impl FlagCategory {
    pub const ALL: [FlagCategory; 4] = [
        Self::MoneyLaundering,
        Self::SuspiciousContracts,
        Self::HistoryRisk,
        Self::SpyIndicator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MoneyLaundering => "money_laundering",
            Self::SuspiciousContracts => "suspicious_contracts",
            Self::HistoryRisk => "history_risk",
            Self::SpyIndicator => "spy_indicator",
        }
    }
}

impl std::fmt::Display for FlagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagCategory {
    type Err = SentinelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| SentinelError::UnknownCategory(s.to_string()))
    }
}

/// A discrete, evidence-backed risk observation.
///
/// `confidence` is always a probability; [`Flag::new`] clamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub severity: Severity,
    pub category: FlagCategory,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

impl Flag {
    pub fn new(
        severity: Severity,
        category: FlagCategory,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            severity,
            category,
            title: title.into(),
            description: description.into(),
            confidence: clamp_probability(confidence),
            evidence: Vec::new(),
        }
    }

    pub fn suspected(
        category: FlagCategory,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self::new(Severity::Suspected, category, title, description, confidence)
    }

    pub fn definite(
        category: FlagCategory,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self::new(Severity::Definite, category, title, description, confidence)
    }

    pub fn with_evidence<I, S>(mut self, evidence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.evidence.extend(evidence.into_iter().map(Into::into));
        self
    }

    pub fn is_definite(&self) -> bool {
        self.severity == Severity::Definite
    }
}

/// Clamp to [0, 1]; NaN maps to 0.
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
