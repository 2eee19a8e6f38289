//! Risk fusion: weighted combination of detector sub-scores.
//!
//! The five weights are policy constants loaded from configuration. They
//! must each lie in [0, 1] and sum to 1.0, so the overall score is a convex
//! combination of the components; [`FusionWeights::validate`] enforces this
//! before an engine is built.

use serde::{Deserialize, Serialize};

use crate::detectors::DetectorOutput;
use crate::domain::{clamp_score, AltCandidate, Flag, RiskScore, Result, SentinelError};

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;
/// Alt candidates above this probability count toward the alt score.
pub const ALT_SCORE_THRESHOLD: f64 = 0.5;
const ALT_SCORE_PER_PROBABILITY: f64 = 20.0;

/// Per-component fusion weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FusionWeights {
    pub history: f64,
    pub indirect: f64,
    pub alt: f64,
    pub financial: f64,
    pub contract: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            history: 0.30,
            indirect: 0.25,
            alt: 0.20,
            financial: 0.15,
            contract: 0.10,
        }
    }
}

impl FusionWeights {
    pub fn as_array(&self) -> [(&'static str, f64); 5] {
        [
            ("history", self.history),
            ("indirect", self.indirect),
            ("alt", self.alt),
            ("financial", self.financial),
            ("contract", self.contract),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().map(|(_, w)| w).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in self.as_array() {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(SentinelError::InvalidConfig(format!(
                    "weight `{name}` must be within [0, 1], got {weight}"
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SentinelError::InvalidConfig(format!(
                "fusion weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }

    /// Weighted overall score, re-clamped to [0, 100].
    pub fn combine(&self, score: &RiskScore) -> f64 {
        clamp_score(
            self.history * score.history
                + self.indirect * score.indirect
                + self.alt * score.alt
                + self.financial * score.financial
                + self.contract * score.contract,
        )
    }
}

/// `min(Σ p × 20, 100)` over candidates with probability above 0.5.
pub fn alt_score(alts: &[AltCandidate]) -> f64 {
    clamp_score(
        alts.iter()
            .filter(|a| a.probability > ALT_SCORE_THRESHOLD)
            .map(|a| a.probability * ALT_SCORE_PER_PROBABILITY)
            .sum(),
    )
}

/// Everything the five detectors produced for one subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorResults {
    pub alts: Vec<AltCandidate>,
    pub financial: DetectorOutput,
    pub contracts: DetectorOutput,
    pub employment: DetectorOutput,
    pub indirect: DetectorOutput,
}

/// Fused score and severity-partitioned flags.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedAssessment {
    pub risk_score: RiskScore,
    pub definite_flags: Vec<Flag>,
    pub suspected_flags: Vec<Flag>,
}

impl FusedAssessment {
    /// All flags, definite first.
    pub fn all_flags(&self) -> impl Iterator<Item = &Flag> {
        self.definite_flags.iter().chain(self.suspected_flags.iter())
    }
}

/// Combine detector results into one assessment.
///
/// Flags are collected in a fixed detector order (financial, contracts,
/// employment, indirect) and then partitioned by severity, preserving that
/// order within each tier.
pub fn fuse(weights: &FusionWeights, results: &DetectorResults) -> FusedAssessment {
    let mut risk_score = RiskScore {
        overall: 0.0,
        history: clamp_score(results.employment.score),
        indirect: clamp_score(results.indirect.score),
        alt: alt_score(&results.alts),
        financial: clamp_score(results.financial.score),
        contract: clamp_score(results.contracts.score),
    };
    risk_score.overall = weights.combine(&risk_score);

    let (definite_flags, suspected_flags): (Vec<Flag>, Vec<Flag>) = [
        &results.financial,
        &results.contracts,
        &results.employment,
        &results.indirect,
    ]
    .into_iter()
    .flat_map(|out| out.flags.iter().cloned())
    .partition(Flag::is_definite);

    FusedAssessment {
        risk_score,
        definite_flags,
        suspected_flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FlagCategory;
    use proptest::prelude::*;

    fn alt(id: u64, probability: f64) -> AltCandidate {
        AltCandidate {
            identity_id: id,
            name: format!("Alt {id}"),
            probability,
            evidence: vec!["evidence".to_string()],
            behaviors: Vec::new(),
        }
    }

    fn output(score: f64, flags: Vec<Flag>) -> DetectorOutput {
        DetectorOutput { flags, score }
    }

    #[test]
    fn test_default_weights_are_valid() {
        let weights = FusionWeights::default();
        weights.validate().unwrap();
        assert!((weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn test_weights_that_do_not_sum_to_one_rejected() {
        let weights = FusionWeights {
            history: 0.40,
            ..FusionWeights::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let weights = FusionWeights {
            history: -0.1,
            indirect: 0.65,
            ..FusionWeights::default()
        };
        assert!(weights.validate().unwrap_err().to_string().contains("history"));

        let nan = FusionWeights {
            alt: f64::NAN,
            ..FusionWeights::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_alt_score_counts_only_likely_alts() {
        assert_eq!(alt_score(&[]), 0.0);
        assert_eq!(alt_score(&[alt(1, 0.5)]), 0.0);
        assert!((alt_score(&[alt(1, 0.7), alt(2, 0.4)]) - 14.0).abs() < 1e-9);
        let many: Vec<AltCandidate> = (0..10).map(|i| alt(i, 0.95)).collect();
        assert_eq!(alt_score(&many), 100.0);
    }

    #[test]
    fn test_fuse_weights_components() {
        let results = DetectorResults {
            alts: vec![alt(9, 0.7)],
            financial: output(40.0, Vec::new()),
            contracts: output(20.0, Vec::new()),
            employment: output(60.0, Vec::new()),
            indirect: output(10.0, Vec::new()),
        };
        let fused = fuse(&FusionWeights::default(), &results);
        // 0.30*60 + 0.25*10 + 0.20*14 + 0.15*40 + 0.10*20
        assert!((fused.risk_score.overall - 31.3).abs() < 1e-9);
        assert!((fused.risk_score.alt - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuse_partitions_flags_in_detector_order() {
        let hostile = Flag::definite(FlagCategory::HistoryRisk, "hostile", "d", 1.0);
        let round_trip = Flag::suspected(FlagCategory::MoneyLaundering, "round", "d", 0.2);
        let standing = Flag::suspected(FlagCategory::SpyIndicator, "standing", "d", 0.4);
        let results = DetectorResults {
            financial: output(15.0, vec![round_trip.clone()]),
            employment: output(60.0, vec![hostile.clone()]),
            indirect: output(10.0, vec![standing.clone()]),
            ..DetectorResults::default()
        };
        let fused = fuse(&FusionWeights::default(), &results);
        assert_eq!(fused.definite_flags, vec![hostile]);
        assert_eq!(fused.suspected_flags, vec![round_trip, standing]);
        assert_eq!(fused.all_flags().count(), 3);
    }

    proptest! {
        #[test]
        fn prop_normalized_weights_sum_to_one(raw in prop::array::uniform5(0.01f64..1.0)) {
            let total: f64 = raw.iter().sum();
            let weights = FusionWeights {
                history: raw[0] / total,
                indirect: raw[1] / total,
                alt: raw[2] / total,
                financial: raw[3] / total,
                contract: raw[4] / total,
            };
            prop_assert!((weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
            prop_assert!(weights.validate().is_ok());
        }

        #[test]
        fn prop_fused_scores_stay_bounded(
            scores in prop::array::uniform4(-1.0e6f64..1.0e6),
            probabilities in prop::collection::vec(0.0f64..=1.0, 0..20),
        ) {
            let results = DetectorResults {
                alts: probabilities.iter().enumerate().map(|(i, p)| alt(i as u64, *p)).collect(),
                financial: output(scores[0], Vec::new()),
                contracts: output(scores[1], Vec::new()),
                employment: output(scores[2], Vec::new()),
                indirect: output(scores[3], Vec::new()),
            };
            let fused = fuse(&FusionWeights::default(), &results);
            prop_assert!((0.0..=100.0).contains(&fused.risk_score.overall));
            for (_, component) in fused.risk_score.components() {
                prop_assert!((0.0..=100.0).contains(&component));
            }
        }
    }
}
