//! External sort by ascending dedup-key length.
//!
//! Downstream similarity scores are sensitive to length difference, so
//! ordering the stream by key length clusters likely near-duplicates into
//! nearby windows and turns an all-pairs problem into small local scans.
//!
//! Input is consumed in consecutive chunks of at most
//! `max_in_memory_run_size` records. Each chunk is stable-sorted in memory;
//! when the input does not fit in a single chunk, every sorted chunk is
//! spooled to a tempfile as a [`run::Run`] and the runs are k-way merged
//! through a min-priority queue keyed by `(key_length, run_index)`. Run
//! storage is reclaimed as soon as the merge drops it.
//!
//! Any I/O failure while writing or reading a run is fatal: a partially
//! sorted stream would silently break the clustering invariant downstream.

mod merge;
mod run;

use std::path::Path;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::EngineError;
use crate::record::DedupRecord;
use merge::KWayMerge;
use run::{key_len, Run};

/// Statistics from the sort/merge stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortStats {
    /// Records sorted.
    pub input: usize,
    /// Number of runs the input was cut into.
    pub runs: usize,
    /// How many of those runs were spooled to disk.
    pub spilled_runs: usize,
    /// Shortest key length in the sorted stream (characters).
    pub min_key_length: usize,
    /// Longest key length in the sorted stream (characters).
    pub max_key_length: usize,
    /// Wall time spent sorting and merging.
    pub elapsed: Duration,
}

/// Sort records by ascending key length, ties keeping original order.
///
/// Consumes the input incrementally so peak memory stays around one run
/// (`max_run_size` records) plus the merged output. With a single run the
/// merge is skipped entirely.
///
/// # Errors
///
/// [`EngineError::RunIo`] / [`EngineError::RunDecode`] if spooled-run
/// storage fails; no partially sorted output is ever returned.
pub fn sort_by_key_length<R>(
    records: impl IntoIterator<Item = R>,
    max_run_size: usize,
    spool_dir: Option<&Path>,
) -> Result<(Vec<R>, SortStats), EngineError>
where
    R: DedupRecord + Serialize + DeserializeOwned,
{
    debug_assert!(max_run_size > 0);
    let start = Instant::now();
    let mut stats = SortStats::default();

    let mut input = records.into_iter();
    // The first sorted chunk stays in memory until a second chunk proves the
    // dataset exceeds one run.
    let mut resident: Option<Vec<R>> = None;
    let mut spooled: Vec<Run<R>> = Vec::new();

    loop {
        let mut chunk: Vec<R> = input.by_ref().take(max_run_size).collect();
        if chunk.is_empty() {
            break;
        }
        stats.input += chunk.len();
        stats.runs += 1;
        chunk.sort_by_key(key_len);

        match resident.take() {
            None if spooled.is_empty() => resident = Some(chunk),
            first => {
                if let Some(first) = first {
                    spooled.push(Run::spool(first, spool_dir)?);
                    stats.spilled_runs += 1;
                }
                spooled.push(Run::spool(chunk, spool_dir)?);
                stats.spilled_runs += 1;
            }
        }
    }

    let sorted = match resident {
        Some(only) => only,
        None if spooled.is_empty() => Vec::new(),
        None => {
            log::debug!("k-way merging {} spooled runs", spooled.len());
            let mut merge = KWayMerge::new(spooled)?;
            let mut out = Vec::with_capacity(stats.input);
            while let Some(record) = merge.next_record()? {
                out.push(record);
            }
            out
        }
    };

    stats.min_key_length = sorted.first().map(key_len).unwrap_or_default();
    stats.max_key_length = sorted.last().map(key_len).unwrap_or_default();
    stats.elapsed = start.elapsed();

    log::info!(
        "sorted {} records by key length ({} to {} chars) in {} runs",
        stats.input,
        stats.min_key_length,
        stats.max_key_length,
        stats.runs
    );

    Ok((sorted, stats))
}
