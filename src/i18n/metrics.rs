//! Reconciliation metrics.
//!
//! One `TranslationMetrics` is created per locale pass; the reconciler records
//! every decision it makes so a run can report how many leaves were translated,
//! preserved, or degraded to source text.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one reconciliation pass.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Leaves carried over verbatim from the target document
    preserved: AtomicUsize,

    /// Missing string leaves translated successfully
    translated: AtomicUsize,

    /// Missing string leaves that kept the source text after a provider error
    fallbacks: AtomicUsize,

    /// Missing non-string scalars copied from the canonical document
    copied: AtomicUsize,

    /// Number of calls made to the translation provider
    api_calls: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_preserved(&self) {
        self.preserved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translated(&self) {
        self.translated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_copied(&self) {
        self.copied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn preserved(&self) -> usize {
        self.preserved.load(Ordering::Relaxed)
    }

    pub fn translated(&self) -> usize {
        self.translated.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn copied(&self) -> usize {
        self.copied.load(Ordering::Relaxed)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    /// Snapshot the counters into a report.
    pub fn report(&self) -> MetricsReport {
        let calls = self.api_calls();
        let failures = self.fallbacks();
        let api_success_rate = if calls > 0 {
            ((calls - failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            preserved: self.preserved(),
            translated: self.translated(),
            fallbacks: failures,
            copied: self.copied(),
            api_calls: calls,
            api_success_rate,
        }
    }
}

/// Snapshot of one locale's reconciliation counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsReport {
    /// Leaves kept from the target document
    pub preserved: usize,

    /// Leaves newly translated
    pub translated: usize,

    /// Leaves that fell back to the source text
    pub fallbacks: usize,

    /// Non-string scalars copied from canonical
    pub copied: usize,

    /// Provider calls made
    pub api_calls: usize,

    /// Provider success rate as a percentage (0-100)
    pub api_success_rate: f64,
}

impl MetricsReport {
    /// Number of keys that were missing from the target document.
    pub fn missing(&self) -> usize {
        self.translated + self.fallbacks + self.copied
    }

    /// True when the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.missing() == 0
    }
}
