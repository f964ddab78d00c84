//! Progress reporting for long dedup runs.
//!
//! The engine reports coarse progress through [`ProgressCallback`]; the
//! default is no reporting at all. [`Progress`] is an indicatif-backed
//! implementation for terminal hosts.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress hook for the dedup pipeline.
///
/// Implement this trait to observe stage and pass boundaries. All methods
/// have empty defaults, so implementors override only what they display.
/// Callbacks may be invoked from worker threads and must be `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// A split has started processing.
    fn on_split_start(&self, _split: &str, _records: usize) {}

    /// A pipeline stage ("exact", "sort", "fuzzy") has started.
    fn on_stage_start(&self, _stage: &str) {}

    /// A fuzzy pass has started over `records` survivors in `windows` windows.
    fn on_pass_start(&self, _pass: usize, _records: usize, _windows: usize) {}

    /// A window finished scanning.
    fn on_window_done(&self, _window: usize) {}

    /// A fuzzy pass finished, removing `removed` records.
    fn on_pass_end(&self, _pass: usize, _removed: usize) {}

    /// A split finished with `kept` survivors.
    fn on_split_end(&self, _split: &str, _kept: usize) {}
}

/// No-op progress reporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressCallback for NullProgress {}

/// Terminal progress reporter using indicatif.
///
/// Shows one bar per fuzzy pass, ticking as windows complete, plus a header
/// line per split.
pub struct Progress {
    multi: MultiProgress,
    pass_bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a reporter. With `quiet` set, nothing is drawn.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            pass_bar: Mutex::new(None),
            quiet,
        }
    }

    fn pass_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} windows ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_split_start(&self, split: &str, records: usize) {
        if self.quiet {
            return;
        }
        let header = self.multi.add(ProgressBar::new_spinner());
        header.set_message(format!("split '{split}': {records} records"));
        header.enable_steady_tick(Duration::from_millis(100));
        header.finish();
    }

    fn on_pass_start(&self, pass: usize, records: usize, windows: usize) {
        if self.quiet {
            return;
        }
        let pb = self.multi.add(ProgressBar::new(windows as u64));
        pb.set_style(Self::pass_style());
        pb.set_message(format!("pass {pass} ({records} records)"));
        *self.pass_bar.lock().unwrap() = Some(pb);
    }

    fn on_window_done(&self, _window: usize) {
        if self.quiet {
            return;
        }
        if let Some(ref pb) = *self.pass_bar.lock().unwrap() {
            pb.inc(1);
        }
    }

    fn on_pass_end(&self, pass: usize, removed: usize) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.pass_bar.lock().unwrap().take() {
            pb.finish_with_message(format!("pass {pass} complete, removed {removed}"));
        }
    }
}
