//! Alt-relationship linker.
//!
//! Links the subject to other identities by two independent signals:
//! similar display names (from a name-search capability) and frequent
//! transfers with the same counterparty. Each candidate accumulates an
//! owned aggregate of evidence, behavior tags, and a running score.

use std::collections::HashMap;

use sentinel_data::{FinancialEvent, Identity, IdentityId, RelationshipRecord};

use crate::detectors::format_units;
use crate::domain::{clamp_probability, AltCandidate};

/// Characters of the subject's name used to query the name search.
pub const SEARCH_PREFIX_CHARS: usize = 5;
/// Transfers with one counterparty needed before it counts as frequent.
pub const FREQUENT_TRANSFER_COUNT: usize = 5;
const FREQUENT_TRANSFER_SCORE: f64 = 0.3;
const EVIDENCE_WEIGHT: f64 = 0.2;
/// Candidates are never certain.
pub const MAX_ALT_PROBABILITY: f64 = 0.95;

pub const BEHAVIOR_NAMING: &str = "naming_pattern";
pub const BEHAVIOR_FREQUENT_TRANSFERS: &str = "frequent_isk_transfers";

/// Query string for the name-search capability.
pub fn name_search_prefix(name: &str) -> String {
    name.chars().take(SEARCH_PREFIX_CHARS).collect()
}

/// Whether two display names share a 3-character prefix or suffix,
/// ignoring case. The prefix rule needs `a` longer than 3 characters.
pub fn names_similar(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len() < 3 || b.len() < 3 {
        return false;
    }
    let same = |x: &[char], y: &[char]| {
        x.iter()
            .flat_map(|c| c.to_lowercase())
            .eq(y.iter().flat_map(|c| c.to_lowercase()))
    };
    if a.len() > 3 && same(&a[..3], &b[..3]) {
        return true;
    }
    same(&a[a.len() - 3..], &b[b.len() - 3..])
}

#[derive(Debug, Default)]
struct CandidateAggregate {
    name: Option<String>,
    evidence: Vec<String>,
    behaviors: Vec<String>,
    score: f64,
}

/// Candidates keyed by identity id, remembering first-seen order.
#[derive(Debug, Default)]
struct CandidateLedger {
    order: Vec<IdentityId>,
    entries: HashMap<IdentityId, CandidateAggregate>,
}

impl CandidateLedger {
    fn contains(&self, id: IdentityId) -> bool {
        self.entries.contains_key(&id)
    }

    fn entry(&mut self, id: IdentityId) -> &mut CandidateAggregate {
        if !self.entries.contains_key(&id) {
            self.order.push(id);
        }
        self.entries.entry(id).or_default()
    }

    fn into_candidates(mut self, names: &HashMap<IdentityId, &str>) -> Vec<AltCandidate> {
        let mut out = Vec::new();
        for id in self.order {
            let Some(agg) = self.entries.remove(&id) else {
                continue;
            };
            if agg.evidence.is_empty() {
                continue;
            }
            let probability = clamp_probability(
                (agg.evidence.len() as f64 * EVIDENCE_WEIGHT + agg.score).min(MAX_ALT_PROBABILITY),
            );
            let name = agg
                .name
                .or_else(|| names.get(&id).map(|n| n.to_string()))
                .unwrap_or_else(|| format!("Unknown identity {id}"));
            out.push(AltCandidate {
                identity_id: id,
                name,
                probability,
                evidence: agg.evidence,
                behaviors: agg.behaviors,
            });
        }
        // Stable: ties keep first-seen order.
        out.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        out
    }
}

/// Rank probable alternate identities of `subject`.
///
/// `search_hits` are the results of searching identities by
/// [`name_search_prefix`] of the subject's name. `relationships` only
/// supply display names for counterparties found through transfers.
pub fn link_alts(
    subject: &Identity,
    events: &[FinancialEvent],
    relationships: &[RelationshipRecord],
    search_hits: &[Identity],
) -> Vec<AltCandidate> {
    let mut ledger = CandidateLedger::default();

    for hit in search_hits {
        if hit.id == subject.id || ledger.contains(hit.id) {
            continue;
        }
        let agg = ledger.entry(hit.id);
        agg.name = Some(hit.name.clone());
        if names_similar(&subject.name, &hit.name) {
            agg.evidence
                .push(format!("Similar name pattern to {}", hit.name));
            agg.behaviors.push(BEHAVIOR_NAMING.to_string());
        }
    }

    let mut counterparty_order: Vec<IdentityId> = Vec::new();
    let mut totals: HashMap<IdentityId, (usize, f64)> = HashMap::new();
    for event in events {
        if event.counterparty_id == subject.id {
            continue;
        }
        let slot = totals.entry(event.counterparty_id).or_insert_with(|| {
            counterparty_order.push(event.counterparty_id);
            (0, 0.0)
        });
        slot.0 += 1;
        slot.1 += event.magnitude();
    }

    for id in counterparty_order {
        let (count, sum) = totals[&id];
        if count < FREQUENT_TRANSFER_COUNT {
            continue;
        }
        let avg = sum / count as f64;
        let agg = ledger.entry(id);
        agg.evidence.push(format!(
            "Frequent transfers ({count} transactions, avg {} units)",
            format_units(avg)
        ));
        agg.behaviors.push(BEHAVIOR_FREQUENT_TRANSFERS.to_string());
        agg.score += FREQUENT_TRANSFER_SCORE;
    }

    let names: HashMap<IdentityId, &str> = relationships
        .iter()
        .map(|r| (r.counterparty_id, r.counterparty_name.as_str()))
        .collect();
    ledger.into_candidates(&names)
}
