//! Recruiter-facing follow-up questions and notes.
//!
//! Questions are derived from the *set* of flag categories present (one
//! canned question per category, never one per flag), the high-probability
//! alt candidates, the overall score tier, and up to two definite flags.
//! A closing general question is always appended.

use std::collections::BTreeSet;

use crate::domain::{AltCandidate, Flag, FlagCategory};

/// Overall score above which the report is marked high risk.
pub const HIGH_RISK_SCORE: f64 = 70.0;
/// Overall score above which the report is marked moderate risk.
pub const MODERATE_RISK_SCORE: f64 = 40.0;
/// Affiliation count at which the history question is asked.
pub const HISTORY_QUESTION_MIN_AFFILIATIONS: usize = 5;

const ALT_NAMES_IN_QUESTION: usize = 3;
const DEFINITE_TITLES_IN_NOTE: usize = 3;
const DEFINITE_TITLES_IN_QUESTION: usize = 2;

pub const CLOSING_QUESTION: &str = "What are your current primary activities \
     (combat, exploration, industry, trade) and which timezone are you usually active in?";

/// Follow-up questions and reviewer notes for one report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowUp {
    pub questions: Vec<String>,
    pub notes: Vec<String>,
}

/// Deterministic given the same inputs.
pub fn generate_questions(
    flags: &[Flag],
    alts: &[AltCandidate],
    affiliation_count: usize,
    overall: f64,
) -> FollowUp {
    let mut out = FollowUp::default();

    let categories: BTreeSet<FlagCategory> = flags.iter().map(|f| f.category).collect();
    for category in categories {
        match category {
            FlagCategory::MoneyLaundering => {
                out.questions.push(
                    "Can you explain the nature of your recent transfers, particularly any \
                     large or unusual transactions?"
                        .to_string(),
                );
                out.notes.push(
                    "Review transaction history carefully for money laundering patterns"
                        .to_string(),
                );
            }
            FlagCategory::SuspiciousContracts => {
                out.questions.push(
                    "We noticed some unusual agreement activity. Can you provide context for \
                     any failed or high-value agreements?"
                        .to_string(),
                );
            }
            FlagCategory::HistoryRisk => {
                if affiliation_count >= HISTORY_QUESTION_MIN_AFFILIATIONS {
                    out.questions.push(format!(
                        "You've been in {affiliation_count} organizations. Can you walk us \
                         through your history and your reasons for leaving each one?"
                    ));
                    out.notes
                        .push("Organization hopper - verify reasons for frequent changes".to_string());
                }
            }
            FlagCategory::SpyIndicator => {
                out.questions.push(
                    "What attracted you to our organization, and what are your long-term goals?"
                        .to_string(),
                );
                out.notes.push(
                    "Potential spy indicators detected - thorough vetting required".to_string(),
                );
            }
        }
    }

    let likely: Vec<&AltCandidate> = alts.iter().filter(|a| a.is_high_probability()).collect();
    if !likely.is_empty() {
        let names: Vec<&str> = likely
            .iter()
            .take(ALT_NAMES_IN_QUESTION)
            .map(|a| a.name.as_str())
            .collect();
        out.questions.push(format!(
            "Do you have any relationship with the following identities: {}?",
            names.join(", ")
        ));
        out.notes.push(format!(
            "Possible alts detected: {} high-probability matches",
            likely.len()
        ));
    }

    if overall > HIGH_RISK_SCORE {
        out.questions.push(
            "Can you provide references from previous organizations or groups you've been in?"
                .to_string(),
        );
        out.notes.push(format!(
            "HIGH RISK (score: {overall:.0}) - Request additional verification"
        ));
    } else if overall > MODERATE_RISK_SCORE {
        out.notes.push(format!(
            "MODERATE RISK (score: {overall:.0}) - Standard vetting procedures"
        ));
    }

    let definite: Vec<&str> = flags
        .iter()
        .filter(|f| f.is_definite())
        .map(|f| f.title.as_str())
        .collect();
    if !definite.is_empty() {
        out.notes.push(format!(
            "HARD FLAGS DETECTED ({}): {}",
            definite.len(),
            definite
                .iter()
                .take(DEFINITE_TITLES_IN_NOTE)
                .copied()
                .collect::<Vec<_>>()
                .join(", ")
        ));
        out.questions.push(format!(
            "We have some concerns based on your history. Can you address the following: {}",
            definite
                .iter()
                .take(DEFINITE_TITLES_IN_QUESTION)
                .copied()
                .collect::<Vec<_>>()
                .join("; ")
        ));
    }

    out.questions.push(CLOSING_QUESTION.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(id: u64, name: &str, probability: f64) -> AltCandidate {
        AltCandidate {
            identity_id: id,
            name: name.to_string(),
            probability,
            evidence: vec!["e".to_string()],
            behaviors: Vec::new(),
        }
    }

    #[test]
    fn test_no_findings_yields_only_closing_question() {
        let out = generate_questions(&[], &[], 0, 0.0);
        assert_eq!(out.questions, vec![CLOSING_QUESTION.to_string()]);
        assert!(out.notes.is_empty());
    }

    #[test]
    fn test_one_question_per_category() {
        let flags = vec![
            Flag::suspected(FlagCategory::MoneyLaundering, "Round-trip", "d", 0.2),
            Flag::suspected(FlagCategory::MoneyLaundering, "Structuring", "d", 0.25),
            Flag::suspected(FlagCategory::SuspiciousContracts, "Churn", "d", 0.65),
        ];
        let out = generate_questions(&flags, &[], 1, 10.0);
        assert_eq!(out.questions.len(), 3);
        assert!(out.questions[0].contains("transfers"));
        assert!(out.questions[1].contains("agreement"));
        assert_eq!(out.notes.len(), 1);
    }

    #[test]
    fn test_history_question_needs_five_affiliations() {
        let flags = vec![Flag::suspected(FlagCategory::HistoryRisk, "Dissolved", "d", 0.6)];
        let few = generate_questions(&flags, &[], 4, 0.0);
        assert_eq!(few.questions.len(), 1);

        let many = generate_questions(&flags, &[], 6, 0.0);
        assert!(many.questions[0].contains("6 organizations"));
        assert_eq!(many.notes, vec!["Organization hopper - verify reasons for frequent changes"]);
    }

    #[test]
    fn test_alt_question_lists_first_three_likely_alts() {
        let alts = vec![
            alt(1, "A", 0.9),
            alt(2, "B", 0.8),
            alt(3, "C", 0.7),
            alt(4, "D", 0.65),
            alt(5, "E", 0.6),
        ];
        let out = generate_questions(&[], &alts, 0, 0.0);
        assert_eq!(
            out.questions[0],
            "Do you have any relationship with the following identities: A, B, C?"
        );
        assert_eq!(out.notes, vec!["Possible alts detected: 4 high-probability matches"]);
    }

    #[test]
    fn test_score_tiers() {
        let high = generate_questions(&[], &[], 0, 71.2);
        assert!(high.notes[0].starts_with("HIGH RISK (score: 71)"));
        assert_eq!(high.questions.len(), 2);

        let at_high = generate_questions(&[], &[], 0, 70.0);
        assert!(at_high.notes[0].starts_with("MODERATE RISK"));

        let low = generate_questions(&[], &[], 0, 40.0);
        assert!(low.notes.is_empty());
    }

    #[test]
    fn test_definite_flags_bounded() {
        let flags: Vec<Flag> = ["One", "Two", "Three", "Four"]
            .iter()
            .map(|t| Flag::definite(FlagCategory::HistoryRisk, *t, "d", 1.0))
            .collect();
        let out = generate_questions(&flags, &[], 1, 0.0);
        assert_eq!(out.notes, vec!["HARD FLAGS DETECTED (4): One, Two, Three"]);
        assert_eq!(
            out.questions[0],
            "We have some concerns based on your history. Can you address the following: One; Two"
        );
        assert_eq!(out.questions.last().map(String::as_str), Some(CLOSING_QUESTION));
    }
}
