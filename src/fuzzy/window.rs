//! Greedy in-window duplicate scan.

use crate::record::DedupRecord;
use crate::similarity;

/// Result of scanning one window.
pub(crate) struct WindowOutcome {
    /// Survival mask, index-aligned with the window slice.
    pub alive: Vec<bool>,
    /// Pairwise similarity evaluations performed.
    pub comparisons: u64,
    /// Records marked dead.
    pub removed: usize,
}

/// Scan a window, marking later near-duplicates of earlier records dead.
///
/// For each still-alive index `a`, every later alive index `b` is compared;
/// `score >= threshold` kills `b` and leaves `a` canonical. Windows with
/// fewer than two records survive untouched. Token-sort keys are prepared
/// once per member, so each pair costs one edit-distance evaluation.
pub(crate) fn scan_window<R: DedupRecord>(
    window: &[R],
    threshold: f64,
    pass: usize,
    window_index: usize,
) -> WindowOutcome {
    let n = window.len();
    let mut outcome = WindowOutcome {
        alive: vec![true; n],
        comparisons: 0,
        removed: 0,
    };
    if n < 2 {
        return outcome;
    }

    let prepared: Vec<String> = window
        .iter()
        .map(|r| similarity::token_sort_key(r.dedup_key().unwrap_or_default()))
        .collect();

    for a in 0..n {
        if !outcome.alive[a] {
            continue;
        }
        for b in (a + 1)..n {
            if !outcome.alive[b] {
                continue;
            }
            outcome.comparisons += 1;
            let score = similarity::ratio(&prepared[a], &prepared[b]);
            if score >= threshold {
                outcome.alive[b] = false;
                outcome.removed += 1;
                log::debug!(
                    "pass {pass} window {window_index}: record {b} is a near-duplicate \
                     of record {a} (score {score:.1})"
                );
                log::trace!(
                    "  canonical key: {:?}",
                    window[a].dedup_key().unwrap_or_default()
                );
            }
        }
    }

    outcome
}
