//! K-way merge of sorted runs through a min-priority queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::de::DeserializeOwned;

use super::run::{key_len, Run};
use crate::error::EngineError;
use crate::record::DedupRecord;

/// Heap entry: the head record of one run.
///
/// Ordered by `(key_length, run_index)` only; the run-index tiebreak keeps
/// equal-length records in original relative order, because runs are cut
/// from consecutive input chunks. Each run has at most one entry in the
/// heap, so the pair is unique.
struct HeapEntry<R> {
    len: usize,
    run: usize,
    record: R,
}

impl<R> PartialEq for HeapEntry<R> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.run == other.run
    }
}

impl<R> Eq for HeapEntry<R> {}

impl<R> PartialOrd for HeapEntry<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> Ord for HeapEntry<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the shortest key first.
        (other.len, other.run).cmp(&(self.len, self.run))
    }
}

/// Merges sorted runs into one stream ordered by ascending key length.
pub(crate) struct KWayMerge<R> {
    runs: Vec<Run<R>>,
    heap: BinaryHeap<HeapEntry<R>>,
}

impl<R: DedupRecord + DeserializeOwned> KWayMerge<R> {
    /// Seed the merge with the head record of each run.
    pub(crate) fn new(mut runs: Vec<Run<R>>) -> Result<Self, EngineError> {
        let mut heap = BinaryHeap::with_capacity(runs.len());
        for (index, run) in runs.iter_mut().enumerate() {
            if let Some(record) = run.next_record()? {
                heap.push(HeapEntry {
                    len: key_len(&record),
                    run: index,
                    record,
                });
            }
        }
        Ok(Self { runs, heap })
    }

    /// Pop the globally smallest record and refill from its run.
    pub(crate) fn next_record(&mut self) -> Result<Option<R>, EngineError> {
        let Some(entry) = self.heap.pop() else {
            return Ok(None);
        };
        if let Some(record) = self.runs[entry.run].next_record()? {
            self.heap.push(HeapEntry {
                len: key_len(&record),
                run: entry.run,
                record,
            });
        }
        Ok(Some(entry.record))
    }
}
