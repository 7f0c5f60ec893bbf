//! Metrics collection for Janitor operations

use crate::janitor::SweepReport;

/// Cumulative counters across sweep passes
#[derive(Debug, Clone, Default)]
pub struct JanitorMetrics {
    /// Tabs evicted (removal requested, timestamp dropped)
    pub evicted: usize,

    /// Eviction candidates spared by the protection rule
    pub protected_skipped: usize,

    /// Orphan timestamp entries purged
    pub orphans_purged: usize,

    /// Removal requests that failed for a reason other than "already gone"
    pub removal_failures: usize,

    /// Total sweep iterations completed
    pub sweep_count: usize,

    /// Sweeps skipped because another one was still running
    pub overlapping_skipped: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,

    /// Epoch millis of the last completed sweep
    pub last_sweep_at: Option<u64>,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed sweep
    pub fn record_sweep(&mut self, report: &SweepReport, at: u64, runtime_ms: u64) {
        if !report.dry_run {
            self.evicted += report.evicted.len();
            self.orphans_purged += report.orphans_purged;
            self.removal_failures += report.removal_failures;
        }
        self.protected_skipped += report.protected;
        self.sweep_count += 1;
        self.total_runtime_ms += runtime_ms;
        self.last_sweep_at = Some(at);
    }

    /// Record a sweep that was skipped due to overlap
    pub fn record_overlap(&mut self) {
        self.overlapping_skipped += 1;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Janitor Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            format!("Evicted: {}", self.evicted),
            format!("Protected (skipped): {}", self.protected_skipped),
            format!("Orphans purged: {}", self.orphans_purged),
        ];

        if self.removal_failures > 0 {
            lines.push(format!("Removal failures: {}", self.removal_failures));
        }
        if self.overlapping_skipped > 0 {
            lines.push(format!("Overlapping sweeps skipped: {}", self.overlapping_skipped));
        }

        lines.join("\n")
    }
}
