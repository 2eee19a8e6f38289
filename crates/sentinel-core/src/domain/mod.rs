//! Domain models for Sentinel.
//!
//! Canonical definitions for the engine's output entities:
//! - `Flag`: evidence-backed observation with severity and confidence
//! - `AltCandidate`: probable alternate identity of the subject
//! - `RiskScore`: composite plus per-detector scores
//! - `AnalysisReport`: the fully assembled result

pub mod alt;
pub mod error;
pub mod flag;
pub mod report;
pub mod score;

// Re-export main types and errors
pub use alt::{AltCandidate, HIGH_PROBABILITY};
pub use error::{Result, SentinelError};
pub use flag::{clamp_probability, Flag, FlagCategory, Severity};
pub use report::{AnalysisReport, TimelineEntry, TimelineEventKind};
pub use score::{clamp_score, RiskScore, MAX_SCORE};
