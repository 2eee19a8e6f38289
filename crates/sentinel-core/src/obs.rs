//! Structured observability hooks for the analysis lifecycle.
//!
//! - `AnalysisSpan`: RAII guard for the subject-scoped span
//! - `emit_*`: one function per lifecycle event (started, detector
//!   completed, finished, not found, fetch failed, validation failed)

use tracing::{debug, info, warn};

use sentinel_data::{IdentityId, Resource};

use crate::detectors::DetectorKind;

/// RAII guard that enters a subject-scoped tracing span for one analysis.
///
/// ```ignore
/// let _span = AnalysisSpan::enter(90000001);
/// // every event below carries subject_id = 90000001
/// ```
pub struct AnalysisSpan {
    _span: tracing::span::EnteredSpan,
}

impl AnalysisSpan {
    pub fn enter(subject_id: IdentityId) -> Self {
        let span = tracing::info_span!("sentinel.analysis", subject_id = subject_id);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_analysis_started(subject_id: IdentityId, mode: &str) {
    info!(event = "analysis.started", subject_id = subject_id, mode = %mode);
}

pub fn emit_detector_completed(detector: DetectorKind, flags: usize, score: f64) {
    debug!(
        event = "analysis.detector_completed",
        detector = %detector,
        flags = flags,
        score = score,
    );
}

/// Emit event: analysis assembled with its headline numbers.
pub fn emit_analysis_finished(
    subject_id: IdentityId,
    overall: f64,
    definite: usize,
    suspected: usize,
    alts: usize,
) {
    info!(
        event = "analysis.finished",
        subject_id = subject_id,
        overall = overall,
        definite_flags = definite,
        suspected_flags = suspected,
        alt_candidates = alts,
    );
}

pub fn emit_subject_not_found(subject_id: IdentityId) {
    warn!(event = "analysis.not_found", subject_id = subject_id);
}

/// Emit event: mandatory fetch failed, analysis aborted (warning level).
pub fn emit_fetch_failed(subject_id: IdentityId, resource: Resource, error: &dyn std::fmt::Display) {
    warn!(
        event = "analysis.fetch_failed",
        subject_id = subject_id,
        resource = %resource,
        error = %error,
    );
}

pub fn emit_validation_failed(subject_id: IdentityId, error: &dyn std::fmt::Display) {
    warn!(
        event = "analysis.validation_failed",
        subject_id = subject_id,
        error = %error,
    );
}
