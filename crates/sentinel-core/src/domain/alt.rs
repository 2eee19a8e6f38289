//! Linked alternate identity candidates.

use serde::{Deserialize, Serialize};

use sentinel_data::IdentityId;

/// Another identity suspected of being controlled by the same actor.
///
/// Only emitted with at least one piece of evidence; `probability` never
/// reaches 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltCandidate {
    pub identity_id: IdentityId,
    pub name: String,
    pub probability: f64,
    pub evidence: Vec<String>,
    pub behaviors: Vec<String>,
}

impl AltCandidate {
    /// Above the threshold recruiters are asked about directly.
    pub fn is_high_probability(&self) -> bool {
        self.probability > HIGH_PROBABILITY
    }
}

/// Probability above which a candidate is treated as a likely alt.
pub const HIGH_PROBABILITY: f64 = 0.6;
