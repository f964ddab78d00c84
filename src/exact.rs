//! Exact deduplication: first occurrence of each distinct key wins.

use std::collections::HashSet;

use growable_bloom_filter::GrowableBloom;
use serde::Serialize;

use crate::record::DedupRecord;

/// False positive rate for the quick-rejection Bloom filter.
const BLOOM_FP_RATE: f64 = 0.01;

/// Statistics from the exact dedup stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExactStats {
    /// Records that entered the stage.
    pub input: usize,
    /// Records that survived.
    pub kept: usize,
    /// Records dropped because an earlier record had a byte-identical key.
    pub removed: usize,
    /// Records skipped because their key was missing or empty. Not counted
    /// as duplicates.
    pub missing_keys: usize,
    /// Records skipped because their key was shorter than the configured
    /// minimum. Not counted as duplicates.
    pub short_keys: usize,
}

impl ExactStats {
    /// Percentage of input removed as exact duplicates.
    #[must_use]
    pub fn removal_rate(&self) -> f64 {
        if self.input == 0 {
            0.0
        } else {
            (self.removed as f64 / self.input as f64) * 100.0
        }
    }
}

/// Remove records whose key is byte-identical to one already seen.
///
/// Emits survivors in original order. Records with a missing or empty key,
/// or a key shorter than `min_key_length` characters, are dropped with a
/// warning event and counted separately from duplicates.
///
/// A Bloom filter fronts the authoritative seen-key set so definite first
/// occurrences skip the set probe.
///
/// # Example
///
/// ```
/// use textdupe::exact::dedupe_exact;
///
/// let records = vec![
///     "alpha".to_string(),
///     "beta".to_string(),
///     "alpha".to_string(),
/// ];
/// let (kept, stats) = dedupe_exact(records, 0);
/// assert_eq!(kept, vec!["alpha".to_string(), "beta".to_string()]);
/// assert_eq!(stats.removed, 1);
/// ```
#[must_use]
pub fn dedupe_exact<R: DedupRecord>(records: Vec<R>, min_key_length: usize) -> (Vec<R>, ExactStats) {
    let mut stats = ExactStats {
        input: records.len(),
        ..Default::default()
    };

    if records.is_empty() {
        return (records, stats);
    }

    let mut kept = Vec::with_capacity(records.len());
    let mut seen_filter = GrowableBloom::new(BLOOM_FP_RATE, records.len().max(16));
    let mut seen: HashSet<String> = HashSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let key = match record.dedup_key() {
            Some(k) if !k.is_empty() => k,
            _ => {
                log::warn!("skipping record {index}: missing or empty dedup key");
                stats.missing_keys += 1;
                continue;
            }
        };

        if min_key_length > 0 && key.chars().count() < min_key_length {
            log::warn!(
                "skipping record {index}: key shorter than {min_key_length} characters"
            );
            stats.short_keys += 1;
            continue;
        }

        if seen_filter.contains(key) && seen.contains(key) {
            log::debug!("exact duplicate at record {index}: {key:?}");
            stats.removed += 1;
            continue;
        }

        seen_filter.insert(key);
        seen.insert(key.to_owned());
        kept.push(record);
    }

    stats.kept = kept.len();
    log::info!(
        "exact dedup: {} -> {} records ({} duplicates, {} unusable keys)",
        stats.input,
        stats.kept,
        stats.removed,
        stats.missing_keys + stats.short_keys
    );

    (kept, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Keyed;

    fn keyed(keys: &[&str]) -> Vec<Keyed<usize>> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| Keyed::new(*k, i))
            .collect()
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let (kept, stats) = dedupe_exact(keyed(&["a", "b", "a", "c", "b"]), 0);
        let keys: Vec<&str> = kept.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.kept, 3);
    }

    #[test]
    fn payload_of_first_occurrence_is_retained() {
        let (kept, _) = dedupe_exact(keyed(&["x", "x"]), 0);
        assert_eq!(kept[0].payload, 0);
    }

    #[test]
    fn missing_keys_are_skipped_not_counted_as_duplicates() {
        let (kept, stats) = dedupe_exact(keyed(&["a", "", "b", ""]), 0);
        assert_eq!(kept.len(), 2);
        assert_eq!(stats.missing_keys, 2);
        assert_eq!(stats.removed, 0);
    }

    #[test]
    fn short_keys_are_skipped_when_minimum_set() {
        let (kept, stats) = dedupe_exact(keyed(&["tiny", "long enough key", "abc"]), 7);
        assert_eq!(kept.len(), 1);
        assert_eq!(stats.short_keys, 2);
        assert_eq!(stats.removed, 0);
    }

    #[test]
    fn minimum_length_counts_characters_not_bytes() {
        // Five two-byte characters; passes a 5-char minimum
        let (kept, stats) = dedupe_exact(keyed(&["ééééé"]), 5);
        assert_eq!(kept.len(), 1);
        assert_eq!(stats.short_keys, 0);
    }

    #[test]
    fn idempotent_when_applied_twice() {
        let (once, first) = dedupe_exact(keyed(&["a", "b", "a", "c", "c", "c"]), 0);
        let expected: Vec<&str> = once.iter().map(|r| r.key.as_str()).collect();
        let (twice, second) = dedupe_exact(once.clone(), 0);
        let got: Vec<&str> = twice.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(expected, got);
        assert_eq!(second.removed, 0);
        assert_eq!(first.kept, second.kept);
    }

    #[test]
    fn empty_input_yields_zero_stats() {
        let (kept, stats) = dedupe_exact(Vec::<Keyed<()>>::new(), 0);
        assert!(kept.is_empty());
        assert_eq!(stats, ExactStats::default());
    }

    #[test]
    fn similar_but_not_identical_keys_both_survive() {
        let (kept, stats) = dedupe_exact(keyed(&["hello world", "hello world!"]), 0);
        assert_eq!(kept.len(), 2);
        assert_eq!(stats.removed, 0);
    }
}
