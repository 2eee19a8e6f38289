//! Bounded risk scores.

use serde::{Deserialize, Serialize};

/// Upper bound of every score.
pub const MAX_SCORE: f64 = 100.0;

/// Composite score plus the five per-detector components, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub overall: f64,
    pub history: f64,
    pub indirect: f64,
    pub alt: f64,
    pub financial: f64,
    pub contract: f64,
}

impl RiskScore {
    pub fn components(&self) -> [(&'static str, f64); 5] {
        [
            ("history", self.history),
            ("indirect", self.indirect),
            ("alt", self.alt),
            ("financial", self.financial),
            ("contract", self.contract),
        ]
    }
}

/// Clamp a score to [0, 100]; NaN maps to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(-5.0), 0.0);
        assert_eq!(clamp_score(250.0), 100.0);
        assert_eq!(clamp_score(42.5), 42.5);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(f64::INFINITY), 100.0);
    }
}
