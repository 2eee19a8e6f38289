//! Global atomic counters for analysis outcomes.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. before the CLI exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    analyses_completed: AtomicU64,
    subjects_not_found: AtomicU64,
    fetch_failures: AtomicU64,
    validation_failures: AtomicU64,
    flags_raised: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            analyses_completed: AtomicU64::new(0),
            subjects_not_found: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            flags_raised: AtomicU64::new(0),
        }
    }

    pub fn inc_analyses_completed(&self) {
        self.analyses_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "analyses_completed", "counter incremented");
    }

    pub fn inc_not_found(&self) {
        self.subjects_not_found.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "subjects_not_found", "counter incremented");
    }

    pub fn inc_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "fetch_failures", "counter incremented");
    }

    pub fn inc_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "validation_failures", "counter incremented");
    }

    pub fn add_flags_raised(&self, n: u64) {
        self.flags_raised.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "flags_raised", n, "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            analyses_completed = self.analyses_completed(),
            subjects_not_found = self.subjects_not_found(),
            fetch_failures = self.fetch_failures(),
            validation_failures = self.validation_failures(),
            flags_raised = self.flags_raised(),
        );
    }

    pub fn analyses_completed(&self) -> u64 {
        self.analyses_completed.load(Ordering::Relaxed)
    }

    pub fn subjects_not_found(&self) -> u64 {
        self.subjects_not_found.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn validation_failures(&self) -> u64 {
        self.validation_failures.load(Ordering::Relaxed)
    }

    pub fn flags_raised(&self) -> u64 {
        self.flags_raised.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.analyses_completed.store(0, Ordering::Relaxed);
        self.subjects_not_found.store(0, Ordering::Relaxed);
        self.fetch_failures.store(0, Ordering::Relaxed);
        self.validation_failures.store(0, Ordering::Relaxed);
        self.flags_raised.store(0, Ordering::Relaxed);
    }
}
