//! Node/edge view of the subject and its alt candidates.
//!
//! Rendering is left to external tools; this only produces a plain
//! structure that serializes cleanly.

use serde::{Deserialize, Serialize};

use sentinel_data::IdentityId;

use crate::domain::AltCandidate;

const SUBJECT_NODE_SIZE: f64 = 20.0;
const CANDIDATE_BASE_SIZE: f64 = 10.0;
const CANDIDATE_SIZE_PER_PROBABILITY: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Subject,
    Candidate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: IdentityId,
    pub label: String,
    pub kind: NodeKind,
    /// Subject is fixed; candidates scale with probability.
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: IdentityId,
    pub target: IdentityId,
    /// The candidate's probability.
    pub weight: f64,
    /// Whole-percent rendering of `weight`.
    pub label: String,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMetadata {
    pub center: IdentityId,
    pub candidate_count: usize,
    pub high_probability_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltNetwork {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: NetworkMetadata,
}

/// Star graph centred on the subject; `None` without candidates.
pub fn build_alt_network(
    subject_id: IdentityId,
    subject_name: &str,
    alts: &[AltCandidate],
) -> Option<AltNetwork> {
    if alts.is_empty() {
        return None;
    }

    let mut nodes = Vec::with_capacity(alts.len() + 1);
    nodes.push(GraphNode {
        id: subject_id,
        label: subject_name.to_string(),
        kind: NodeKind::Subject,
        size: SUBJECT_NODE_SIZE,
    });

    let mut edges = Vec::with_capacity(alts.len());
    for alt in alts {
        nodes.push(GraphNode {
            id: alt.identity_id,
            label: alt.name.clone(),
            kind: NodeKind::Candidate,
            size: CANDIDATE_BASE_SIZE + alt.probability * CANDIDATE_SIZE_PER_PROBABILITY,
        });
        edges.push(GraphEdge {
            source: subject_id,
            target: alt.identity_id,
            weight: alt.probability,
            label: format!("{:.0}%", alt.probability * 100.0),
            evidence: alt.evidence.clone(),
        });
    }

    Some(AltNetwork {
        nodes,
        edges,
        metadata: NetworkMetadata {
            center: subject_id,
            candidate_count: alts.len(),
            high_probability_count: alts.iter().filter(|a| a.is_high_probability()).count(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(id: u64, probability: f64) -> AltCandidate {
        AltCandidate {
            identity_id: id,
            name: format!("Alt {id}"),
            probability,
            evidence: vec![format!("evidence {id}")],
            behaviors: Vec::new(),
        }
    }

    #[test]
    fn test_no_candidates_no_network() {
        assert!(build_alt_network(1, "Subject", &[]).is_none());
    }

    #[test]
    fn test_star_graph_shape() {
        let network = build_alt_network(1, "Subject", &[alt(2, 0.7), alt(3, 0.4)]).unwrap();

        assert_eq!(network.nodes.len(), 3);
        assert_eq!(network.nodes[0].kind, NodeKind::Subject);
        assert_eq!(network.nodes[0].size, 20.0);
        assert!((network.nodes[1].size - 17.0).abs() < 1e-9);

        assert_eq!(network.edges.len(), 2);
        assert!(network.edges.iter().all(|e| e.source == 1));
        assert_eq!(network.edges[0].label, "70%");
        assert_eq!(network.edges[1].evidence, vec!["evidence 3"]);

        assert_eq!(
            network.metadata,
            NetworkMetadata {
                center: 1,
                candidate_count: 2,
                high_probability_count: 1,
            }
        );
    }
}
