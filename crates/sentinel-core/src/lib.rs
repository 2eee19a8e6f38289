//! Sentinel Core Library
//!
//! Multi-signal risk fusion for recruitment vetting. Five independent
//! detectors read an immutable snapshot of a subject's history; their
//! flags and sub-scores are fused into one weighted composite, then
//! enriched with a timeline, an alt network, and follow-up questions.
//!
//! ## Layer 1 - Analysis
//!
//! Input records and the retrieval capability live in `sentinel-data`.
//! This crate owns everything from detection to the exported report.

pub mod config;
pub mod detectors;
pub mod domain;
pub mod engine;
pub mod fusion;
pub mod graph;
pub mod metrics;
pub mod obs;
pub mod questions;
pub mod reporting;
pub mod telemetry;
pub mod timeline;

/// Version stamped into every report's metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::{DetectorMode, EngineSettings, FetchLimits, SentinelConfig};

pub use detectors::{
    detect_contract_patterns, detect_employment_risk, detect_financial_patterns,
    detect_indirect_indicators, link_alts, DetectorKind, DetectorOutput, GroupDirectory,
};

pub use domain::{
    AltCandidate, AnalysisReport, Flag, FlagCategory, Result, RiskScore, SentinelError, Severity,
    TimelineEntry, TimelineEventKind,
};

pub use engine::{run_detectors, run_detectors_parallel, SentinelEngine, SubjectSnapshot};

pub use fusion::{alt_score, fuse, DetectorResults, FusedAssessment, FusionWeights};

pub use graph::{build_alt_network, AltNetwork, GraphEdge, GraphNode, NodeKind};

pub use questions::{generate_questions, FollowUp};

pub use reporting::{read_report_artifact, render_report_md, write_report_artifact};

pub use timeline::reconstruct_timeline;
