use proptest::prelude::*;

use textdupe::config::EngineConfig;
use textdupe::engine::Engine;
use textdupe::exact::dedupe_exact;
use textdupe::sort::sort_by_key_length;

fn small_engine(window: usize) -> Engine {
    Engine::new(
        EngineConfig::default()
            .with_base_window_size(window)
            .with_worker_count(2)
            .with_max_passes(3),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn output_never_exceeds_input(
        keys in prop::collection::vec("[a-d ]{0,12}", 0..40),
        window in 1usize..8,
    ) {
        let engine = small_engine(window);
        let (kept, telemetry) = engine.dedupe_split("default", keys.clone()).unwrap();
        prop_assert!(kept.len() <= keys.len());
        prop_assert_eq!(telemetry.final_count, kept.len());
        prop_assert_eq!(telemetry.original, keys.len());
    }

    #[test]
    fn engine_is_deterministic(
        keys in prop::collection::vec("[a-c ]{0,10}", 0..30),
        window in 1usize..6,
    ) {
        let engine = small_engine(window);
        let (first, _) = engine.dedupe_split("default", keys.clone()).unwrap();
        let (second, _) = engine.dedupe_split("default", keys).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn exact_dedup_is_idempotent(keys in prop::collection::vec("[a-c]{0,6}", 0..50)) {
        let (once, _) = dedupe_exact(keys, 0);
        let (twice, stats) = dedupe_exact(once.clone(), 0);
        prop_assert_eq!(once, twice);
        prop_assert_eq!(stats.removed, 0);
        prop_assert_eq!(stats.missing_keys, 0);
    }

    #[test]
    fn exact_dedup_keys_are_unique(keys in prop::collection::vec("[a-c]{1,6}", 0..50)) {
        let (kept, _) = dedupe_exact(keys, 0);
        let mut seen = std::collections::HashSet::new();
        for key in &kept {
            prop_assert!(seen.insert(key.clone()), "duplicate key survived: {key:?}");
        }
    }

    #[test]
    fn sort_is_non_decreasing_in_key_length(
        keys in prop::collection::vec("[a-f]{0,10}", 0..60),
        run_size in 1usize..8,
    ) {
        let (sorted, stats) = sort_by_key_length(keys.clone(), run_size, None).unwrap();
        prop_assert_eq!(sorted.len(), keys.len());
        prop_assert_eq!(stats.input, keys.len());
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].chars().count() <= pair[1].chars().count());
        }
    }

    #[test]
    fn sort_preserves_original_order_for_ties(
        keys in prop::collection::vec("[a-f]{3}", 0..40),
        run_size in 1usize..8,
    ) {
        // All keys share one length: the sort must be the identity
        let (sorted, _) = sort_by_key_length(keys.clone(), run_size, None).unwrap();
        prop_assert_eq!(sorted, keys);
    }

    #[test]
    fn sort_is_a_permutation(
        keys in prop::collection::vec("[a-f]{0,8}", 0..40),
        run_size in 1usize..6,
    ) {
        let (sorted, _) = sort_by_key_length(keys.clone(), run_size, None).unwrap();
        let mut expected = keys;
        let mut got = sorted;
        expected.sort();
        got.sort();
        prop_assert_eq!(expected, got);
    }
}
