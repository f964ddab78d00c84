//! Engine configuration.
//!
//! [`EngineConfig`] is an explicit value threaded through every stage; the
//! engine holds no process-wide state. The struct deserializes with
//! per-field defaults so a surrounding tool can populate it from whatever
//! configuration surface it exposes, and offers builder-style `with_*`
//! methods for programmatic use.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::progress::ProgressCallback;

fn default_initial_threshold() -> f64 {
    80.0
}

fn default_threshold_reduction() -> f64 {
    5.0
}

fn default_threshold_floor() -> f64 {
    70.0
}

fn default_max_passes() -> usize {
    3
}

fn default_base_window_size() -> usize {
    2500
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(4)
        .max(4)
}

fn default_max_in_memory_run_size() -> usize {
    10_000
}

/// Configuration for the deduplication engine.
///
/// Thresholds and similarity scores share one `[0, 100]` scale. Pass *i*
/// (0-indexed) runs at threshold `max(initial_threshold −
/// threshold_reduction_per_pass · i, threshold_floor)` over windows of
/// `base_window_size · (i + 1)` records.
#[derive(Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Similarity threshold for pass 0, in `[0, 100]`.
    #[serde(default = "default_initial_threshold")]
    pub initial_threshold: f64,
    /// How much the threshold drops on each subsequent pass.
    #[serde(default = "default_threshold_reduction")]
    pub threshold_reduction_per_pass: f64,
    /// The threshold never decays below this floor, in `[0, 100]`.
    #[serde(default = "default_threshold_floor")]
    pub threshold_floor: f64,
    /// Maximum number of fuzzy passes. Convergence (a pass removing zero
    /// records) stops earlier.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
    /// Window size for pass 0; later passes grow it linearly.
    #[serde(default = "default_base_window_size")]
    pub base_window_size: usize,
    /// Size of the fuzzy worker pool.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Maximum records sorted in memory as one run; larger inputs spill
    /// sorted runs to disk and k-way merge them.
    #[serde(default = "default_max_in_memory_run_size")]
    pub max_in_memory_run_size: usize,
    /// Keys shorter than this many characters are skipped during key
    /// validation. 0 disables the filter.
    #[serde(default)]
    pub min_key_length: usize,
    /// Directory for spooled sort runs. `None` uses the system temp dir.
    #[serde(default)]
    pub spool_dir: Option<std::path::PathBuf>,
    /// Optional progress reporting hook.
    #[serde(skip)]
    pub progress: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("initial_threshold", &self.initial_threshold)
            .field(
                "threshold_reduction_per_pass",
                &self.threshold_reduction_per_pass,
            )
            .field("threshold_floor", &self.threshold_floor)
            .field("max_passes", &self.max_passes)
            .field("base_window_size", &self.base_window_size)
            .field("worker_count", &self.worker_count)
            .field("max_in_memory_run_size", &self.max_in_memory_run_size)
            .field("min_key_length", &self.min_key_length)
            .field("spool_dir", &self.spool_dir)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_threshold: default_initial_threshold(),
            threshold_reduction_per_pass: default_threshold_reduction(),
            threshold_floor: default_threshold_floor(),
            max_passes: default_max_passes(),
            base_window_size: default_base_window_size(),
            worker_count: default_worker_count(),
            max_in_memory_run_size: default_max_in_memory_run_size(),
            min_key_length: 0,
            spool_dir: None,
            progress: None,
        }
    }
}

impl EngineConfig {
    /// Set the pass-0 similarity threshold.
    #[must_use]
    pub fn with_initial_threshold(mut self, threshold: f64) -> Self {
        self.initial_threshold = threshold;
        self
    }

    /// Set the per-pass threshold reduction.
    #[must_use]
    pub fn with_threshold_reduction(mut self, reduction: f64) -> Self {
        self.threshold_reduction_per_pass = reduction;
        self
    }

    /// Set the threshold floor.
    #[must_use]
    pub fn with_threshold_floor(mut self, floor: f64) -> Self {
        self.threshold_floor = floor;
        self
    }

    /// Set the maximum pass count.
    #[must_use]
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// Set the pass-0 window size.
    #[must_use]
    pub fn with_base_window_size(mut self, size: usize) -> Self {
        self.base_window_size = size;
        self
    }

    /// Set the worker pool size.
    #[must_use]
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    /// Set the maximum in-memory run size for the sort stage.
    #[must_use]
    pub fn with_max_in_memory_run_size(mut self, size: usize) -> Self {
        self.max_in_memory_run_size = size;
        self
    }

    /// Set the minimum usable key length.
    #[must_use]
    pub fn with_min_key_length(mut self, length: usize) -> Self {
        self.min_key_length = length;
        self
    }

    /// Set the directory spooled sort runs are written to.
    #[must_use]
    pub fn with_spool_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.spool_dir = Some(dir.into());
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The threshold for a given pass index.
    #[must_use]
    pub fn threshold_for_pass(&self, pass: usize) -> f64 {
        (self.initial_threshold - self.threshold_reduction_per_pass * pass as f64)
            .max(self.threshold_floor)
    }

    /// The window size for a given pass index.
    #[must_use]
    pub fn window_size_for_pass(&self, pass: usize) -> usize {
        self.base_window_size * (pass + 1)
    }

    /// Validate every parameter, rejecting values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        fn reject(field: &'static str, reason: impl Into<String>) -> Result<(), EngineError> {
            Err(EngineError::Config {
                field,
                reason: reason.into(),
            })
        }

        if !self.initial_threshold.is_finite()
            || !(0.0..=100.0).contains(&self.initial_threshold)
        {
            return reject(
                "initial_threshold",
                format!("must be in [0, 100], got {}", self.initial_threshold),
            );
        }
        if !self.threshold_reduction_per_pass.is_finite()
            || self.threshold_reduction_per_pass < 0.0
        {
            return reject(
                "threshold_reduction_per_pass",
                format!(
                    "must be a non-negative number, got {}",
                    self.threshold_reduction_per_pass
                ),
            );
        }
        if !self.threshold_floor.is_finite() || !(0.0..=100.0).contains(&self.threshold_floor) {
            return reject(
                "threshold_floor",
                format!("must be in [0, 100], got {}", self.threshold_floor),
            );
        }
        if self.threshold_floor > self.initial_threshold {
            return reject(
                "threshold_floor",
                format!(
                    "floor {} exceeds initial threshold {}",
                    self.threshold_floor, self.initial_threshold
                ),
            );
        }
        if self.max_passes == 0 {
            return reject("max_passes", "must be at least 1");
        }
        if self.base_window_size == 0 {
            return reject("base_window_size", "must be at least 1");
        }
        if self.worker_count == 0 {
            return reject("worker_count", "must be at least 1");
        }
        if self.max_in_memory_run_size == 0 {
            return reject("max_in_memory_run_size", "must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn threshold_decays_to_floor() {
        let config = EngineConfig::default()
            .with_initial_threshold(80.0)
            .with_threshold_reduction(5.0)
            .with_threshold_floor(70.0);
        assert_eq!(config.threshold_for_pass(0), 80.0);
        assert_eq!(config.threshold_for_pass(1), 75.0);
        assert_eq!(config.threshold_for_pass(2), 70.0);
        // Clamped at the floor from here on
        assert_eq!(config.threshold_for_pass(5), 70.0);
    }

    #[test]
    fn window_grows_linearly() {
        let config = EngineConfig::default().with_base_window_size(100);
        assert_eq!(config.window_size_for_pass(0), 100);
        assert_eq!(config.window_size_for_pass(1), 200);
        assert_eq!(config.window_size_for_pass(3), 400);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = EngineConfig::default()
            .with_initial_threshold(120.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config {
                field: "initial_threshold",
                ..
            }
        ));
    }

    #[test]
    fn rejects_floor_above_initial() {
        let err = EngineConfig::default()
            .with_initial_threshold(60.0)
            .with_threshold_floor(75.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config {
                field: "threshold_floor",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_window() {
        let err = EngineConfig::default()
            .with_base_window_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config {
                field: "base_window_size",
                ..
            }
        ));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.initial_threshold, 80.0);
        assert_eq!(config.base_window_size, 2500);
        assert_eq!(config.min_key_length, 0);
    }

    #[test]
    fn deserializes_partial_overrides() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"initial_threshold": 90, "max_passes": 1}"#).unwrap();
        assert_eq!(config.initial_threshold, 90.0);
        assert_eq!(config.max_passes, 1);
        assert_eq!(config.threshold_floor, 70.0);
    }
}
