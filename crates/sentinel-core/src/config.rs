//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! [weights]
//! history = 0.30
//! indirect = 0.25
//! alt = 0.20
//! financial = 0.15
//! contract = 0.10
//!
//! [limits]
//! financial_events = 1000
//! agreements = 500        # 0 fetches everything
//!
//! [engine]
//! detector_mode = "parallel"
//! ```
//!
//! Every section is optional; missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Result;
use crate::fusion::FusionWeights;

pub const DEFAULT_FINANCIAL_EVENT_LIMIT: usize = 1000;
pub const DEFAULT_AGREEMENT_LIMIT: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentinelConfig {
    pub weights: FusionWeights,
    pub limits: FetchLimits,
    pub engine: EngineSettings,
}

impl SentinelConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()
    }
}

/// Caps passed to the data source for the unbounded history lists.
///
/// `None` requests the full list; in TOML it is written as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchLimits {
    #[serde(with = "zero_is_unbounded")]
    pub financial_events: Option<usize>,
    #[serde(with = "zero_is_unbounded")]
    pub agreements: Option<usize>,
}

mod zero_is_unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        limit: &Option<usize>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(limit.unwrap_or(0) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<usize>, D::Error> {
        let limit = usize::deserialize(deserializer)?;
        Ok((limit > 0).then_some(limit))
    }
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            financial_events: Some(DEFAULT_FINANCIAL_EVENT_LIMIT),
            agreements: Some(DEFAULT_AGREEMENT_LIMIT),
        }
    }
}

/// How detectors are scheduled. Both modes produce identical reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorMode {
    Sequential,
    /// One tokio task per detector, joined before fusion.
    #[default]
    Parallel,
}

impl std::fmt::Display for DetectorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    pub detector_mode: DetectorMode,
}
