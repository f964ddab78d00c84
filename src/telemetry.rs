//! Telemetry aggregation.
//!
//! Stage results roll up into one [`SplitTelemetry`] per split and one
//! [`EngineReport`] per run. Everything here is plain data: the aggregator
//! performs no I/O, and formatting beyond [`EngineReport::summary`] is the
//! caller's concern. All types serialize, so reports can be exported as-is.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SplitWarning;
use crate::exact::ExactStats;
use crate::fuzzy::PassOutcome;
use crate::sort::SortStats;

/// Everything measured while deduplicating one split.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitTelemetry {
    /// Records the caller supplied for this split.
    pub original: usize,
    /// Exact-dedup stage counts.
    pub exact: ExactStats,
    /// Sort/merge stage counts.
    pub sort: SortStats,
    /// One entry per executed fuzzy pass, in pass order.
    pub passes: Vec<PassOutcome>,
    /// Records in the final output.
    pub final_count: usize,
    /// Wall time for the whole split.
    pub elapsed: Duration,
    /// Non-fatal conditions observed while processing.
    pub warnings: Vec<SplitWarning>,
}

impl SplitTelemetry {
    /// Records entering the fuzzy matcher (after exact dedup).
    #[must_use]
    pub fn post_exact(&self) -> usize {
        self.exact.kept
    }

    /// Records removed by fuzzy passes.
    #[must_use]
    pub fn fuzzy_removed(&self) -> usize {
        self.passes.iter().map(|p| p.removed).sum()
    }

    /// Records removed by all stages, including unusable-key skips.
    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.original - self.final_count
    }

    /// Percentage of the original split that was removed.
    #[must_use]
    pub fn reduction_percent(&self) -> f64 {
        if self.original == 0 {
            0.0
        } else {
            (self.total_removed() as f64 / self.original as f64) * 100.0
        }
    }

    /// Records per second over the whole split.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.original as f64 / secs
        } else {
            0.0
        }
    }
}

/// Run-wide report: one [`SplitTelemetry`] per split plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct EngineReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Per-split telemetry, keyed by split name.
    pub splits: BTreeMap<String, SplitTelemetry>,
}

impl Default for EngineReport {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineReport {
    /// Create an empty report stamped now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            splits: BTreeMap::new(),
        }
    }

    /// Record a finished split.
    pub fn record_split(&mut self, name: impl Into<String>, telemetry: SplitTelemetry) {
        self.splits.insert(name.into(), telemetry);
    }

    /// Total records across all splits.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.splits.values().map(|s| s.original).sum()
    }

    /// Total records removed across all splits.
    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.splits.values().map(|s| s.total_removed()).sum()
    }

    /// Summed wall time across splits.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.splits.values().map(|s| s.elapsed).sum()
    }

    /// Percentage of all input removed.
    #[must_use]
    pub fn reduction_percent(&self) -> f64 {
        let total = self.total_records();
        if total == 0 {
            0.0
        } else {
            (self.total_removed() as f64 / total as f64) * 100.0
        }
    }

    /// One-line status summary.
    ///
    /// The aggregator never prints; hosts log or display this line
    /// themselves.
    #[must_use]
    pub fn summary(&self) -> String {
        let total = self.total_records();
        let secs = self.elapsed().as_secs_f64();
        let speed = if secs > 0.0 { total as f64 / secs } else { 0.0 };
        format!(
            "TELEMETRY: Processed {} records in {:.1}s • Removed {} duplicates ({:.1}%) • \
             Speed: {:.1} records/s • Splits: {}",
            total,
            secs,
            self.total_removed(),
            self.reduction_percent(),
            speed,
            self.splits.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(removed: usize, input: usize) -> PassOutcome {
        PassOutcome {
            pass: 0,
            threshold: 80.0,
            window_size: 100,
            windows: 1,
            input,
            comparisons: (input * (input - 1) / 2) as u64,
            removed,
            resulting: input - removed,
            elapsed: Duration::from_millis(5),
        }
    }

    fn split(original: usize, exact_removed: usize, fuzzy_removed: usize) -> SplitTelemetry {
        let post_exact = original - exact_removed;
        SplitTelemetry {
            original,
            exact: ExactStats {
                input: original,
                kept: post_exact,
                removed: exact_removed,
                ..Default::default()
            },
            passes: vec![pass(fuzzy_removed, post_exact)],
            final_count: post_exact - fuzzy_removed,
            elapsed: Duration::from_secs(2),
            ..Default::default()
        }
    }

    #[test]
    fn split_counts_add_up() {
        let t = split(100, 10, 5);
        assert_eq!(t.post_exact(), 90);
        assert_eq!(t.fuzzy_removed(), 5);
        assert_eq!(t.total_removed(), 15);
        assert_eq!(t.reduction_percent(), 15.0);
        assert_eq!(t.throughput(), 50.0);
    }

    #[test]
    fn empty_split_telemetry_is_all_zero() {
        let t = SplitTelemetry::default();
        assert_eq!(t.total_removed(), 0);
        assert_eq!(t.reduction_percent(), 0.0);
        assert_eq!(t.throughput(), 0.0);
    }

    #[test]
    fn report_totals_span_splits() {
        let mut report = EngineReport::new();
        report.record_split("english", split(100, 10, 5));
        report.record_split("chinese", split(50, 0, 10));
        assert_eq!(report.total_records(), 150);
        assert_eq!(report.total_removed(), 25);
        assert_eq!(report.elapsed(), Duration::from_secs(4));
    }

    #[test]
    fn summary_line_mentions_totals() {
        let mut report = EngineReport::new();
        report.record_split("default", split(200, 20, 30));
        let line = report.summary();
        assert!(line.contains("200 records"));
        assert!(line.contains("Removed 50"));
        assert!(line.contains("Splits: 1"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = EngineReport::new();
        report.record_split("default", split(10, 1, 2));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"default\""));
        assert!(json.contains("\"passes\""));
    }
}
