//! Multi-pass windowed fuzzy matching.
//!
//! Each pass partitions the surviving stream into fixed-size windows and
//! scans every window in parallel on a dedicated worker pool. Thresholds
//! decay and windows grow from pass to pass, so later passes cast a wider,
//! more tolerant net over an already-thinned stream. A pass that removes
//! nothing ends the loop early; near-duplicates that straddle a window
//! boundary are out of reach by design.

mod window;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::record::DedupRecord;
use window::{scan_window, WindowOutcome};

/// Statistics for one executed pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassOutcome {
    /// Zero-based pass index.
    pub pass: usize,
    /// Similarity threshold this pass ran at.
    pub threshold: f64,
    /// Window size this pass ran at.
    pub window_size: usize,
    /// Number of windows scanned.
    pub windows: usize,
    /// Records that entered the pass.
    pub input: usize,
    /// Pairwise similarity evaluations performed.
    pub comparisons: u64,
    /// Records removed as near-duplicates.
    pub removed: usize,
    /// Records surviving the pass.
    pub resulting: usize,
    /// Wall time for the pass.
    pub elapsed: Duration,
}

impl PassOutcome {
    /// Percentage of the pass's input that was removed.
    #[must_use]
    pub fn removal_rate(&self) -> f64 {
        if self.input == 0 {
            0.0
        } else {
            (self.removed as f64 / self.input as f64) * 100.0
        }
    }

    /// Records per second for this pass.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.input as f64 / secs
        } else {
            0.0
        }
    }
}

/// Run decaying-threshold fuzzy passes until convergence or the pass budget.
///
/// Survivor order is deterministic: window assignment and the in-window
/// canonical choice are pure functions of input order and configuration.
///
/// # Errors
///
/// [`EngineError::Worker`] if a window scan panics; the error names the
/// pass and window for diagnosis, and no partial pass output is kept.
pub fn dedupe_fuzzy<R>(
    records: Vec<R>,
    config: &EngineConfig,
) -> Result<(Vec<R>, Vec<PassOutcome>), EngineError>
where
    R: DedupRecord + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count)
        .build()
        .unwrap_or_else(|_| {
            log::warn!(
                "failed to create worker pool of {}, using default pool with {} threads",
                config.worker_count,
                rayon::current_num_threads()
            );
            rayon::ThreadPoolBuilder::new().build().unwrap()
        });

    let mut survivors = records;
    let mut passes = Vec::new();

    for pass in 0..config.max_passes {
        let threshold = config.threshold_for_pass(pass);
        let window_size = config.window_size_for_pass(pass);
        let input = survivors.len();
        let start = Instant::now();

        let windows: Vec<&[R]> = survivors.chunks(window_size).collect();
        log::info!(
            "pass {pass}: {input} records, {} windows of {window_size}, threshold {threshold:.1}",
            windows.len()
        );
        if let Some(ref progress) = config.progress {
            progress.on_pass_start(pass, input, windows.len());
        }

        let outcomes: Vec<WindowOutcome> = pool.install(|| {
            windows
                .par_iter()
                .enumerate()
                .map(|(index, window)| {
                    let outcome = catch_unwind(AssertUnwindSafe(|| {
                        scan_window(window, threshold, pass, index)
                    }))
                    .map_err(|payload| EngineError::Worker {
                        pass,
                        window: index,
                        message: panic_message(payload.as_ref()),
                    })?;
                    if let Some(ref progress) = config.progress {
                        progress.on_window_done(index);
                    }
                    Ok(outcome)
                })
                .collect::<Result<_, EngineError>>()
        })?;

        let windows_scanned = outcomes.len();
        let comparisons: u64 = outcomes.iter().map(|o| o.comparisons).sum();
        let removed: usize = outcomes.iter().map(|o| o.removed).sum();

        // Reassemble in window order, then intra-window survivor order.
        let alive = outcomes.into_iter().flat_map(|o| o.alive);
        survivors = survivors
            .into_iter()
            .zip(alive)
            .filter_map(|(record, keep)| keep.then_some(record))
            .collect();

        let outcome = PassOutcome {
            pass,
            threshold,
            window_size,
            windows: windows_scanned,
            input,
            comparisons,
            removed,
            resulting: survivors.len(),
            elapsed: start.elapsed(),
        };
        log::info!(
            "pass {pass} complete: removed {removed} of {input} ({} comparisons) in {:.2?}",
            comparisons,
            outcome.elapsed
        );
        if let Some(ref progress) = config.progress {
            progress.on_pass_end(pass, removed);
        }
        passes.push(outcome);

        if removed == 0 {
            log::info!("pass {pass} removed nothing, converged");
            break;
        }
    }

    Ok((survivors, passes))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "window scan panicked".to_string()
    }
}
