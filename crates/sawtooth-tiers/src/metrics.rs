//! Metrics and reporting for tier operations.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Tier operation metrics (thread-safe counters).
///
/// Cloning shares the counters, so one handle can be kept by the caller
/// while the tier records into another.
#[derive(Debug, Clone, Default)]
pub struct TierMetrics {
    /// Reads that found a value
    pub hits: Arc<AtomicU64>,
    /// Reads that found nothing
    pub misses: Arc<AtomicU64>,
    /// Successful writes
    pub writes: Arc<AtomicU64>,
}

impl TierMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a read outcome.
    pub fn record_read(&self, found: bool) {
        if found {
            self.record_hit();
        } else {
            self.record_miss();
        }
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> TierMetricsSnapshot {
        TierMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of metrics (for reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
}

impl TierMetricsSnapshot {
    pub fn total_reads(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of reads that found a value.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_reads();
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// Format a human-readable report.
    pub fn format_report(&self, name: &str) -> String {
        [
            format!("Tier Metrics: {}", name),
            "=".repeat(30),
            format!("  Hits:      {}", self.hits),
            format!("  Misses:    {}", self.misses),
            format!("  Writes:    {}", self.writes),
            format!("  Hit Rate:  {:.1}%", self.hit_rate() * 100.0),
        ]
        .join("\n")
    }
}
