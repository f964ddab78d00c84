//! Normalized, order-insensitive string similarity.
//!
//! Scores are on a `[0, 100]` scale, matching the engine's thresholds.
//! The metric is a token-sort ratio: both keys are normalized, split into
//! whitespace tokens, the tokens sorted and re-joined, and the results
//! compared by normalized Levenshtein distance. Word order therefore never
//! affects the score ("hello world" and "world hello" score 100).

use unicode_normalization::UnicodeNormalization;

/// Normalize a key for comparison.
///
/// NFC-normalizes, lowercases, strips ASCII punctuation and collapses
/// whitespace, so trivially different spellings of the same text compare
/// equal.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.nfc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the canonical token-sorted form of a key.
///
/// The O(n²) window scan calls this once per record and then compares the
/// prepared forms pairwise with [`ratio`], so each pair costs a single
/// edit-distance evaluation.
#[must_use]
pub fn token_sort_key(text: &str) -> String {
    let normalized = normalize(text);
    let mut tokens: Vec<&str> = normalized.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity of two already-prepared keys, in `[0, 100]`.
///
/// Two empty strings are identical and score 100.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Order-insensitive similarity of two raw keys, in `[0, 100]`.
///
/// Convenience wrapper combining [`token_sort_key`] and [`ratio`]; prefer
/// preparing keys up front when comparing one key against many.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&token_sort_key(a), &token_sort_key(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_case_punctuation_and_extra_spaces() {
        let input = "Hello, World! This is a TEST.   With multiple   spaces.";
        assert_eq!(
            normalize(input),
            "hello world this is a test with multiple spaces"
        );
    }

    #[test]
    fn normalize_composes_unicode() {
        // "é" as 'e' + combining acute vs precomposed
        assert_eq!(normalize("cafe\u{0301}"), normalize("caf\u{e9}"));
    }

    #[test]
    fn identical_keys_score_100() {
        assert_eq!(token_sort_ratio("hello world", "hello world"), 100.0);
    }

    #[test]
    fn word_order_does_not_matter() {
        assert_eq!(token_sort_ratio("foo bar baz", "baz bar foo"), 100.0);
    }

    #[test]
    fn empty_keys_are_identical() {
        assert_eq!(token_sort_ratio("", ""), 100.0);
    }

    #[test]
    fn near_duplicates_score_high() {
        let score = token_sort_ratio("hello world", "hello world!");
        // Punctuation is stripped by normalization
        assert_eq!(score, 100.0);

        let score = token_sort_ratio("foo bar baz", "foo  bar baz");
        assert_eq!(score, 100.0);
    }

    #[test]
    fn unrelated_keys_score_low() {
        let score = token_sort_ratio("hello world", "completely different text");
        assert!(score < 50.0, "unexpected score {score}");
    }

    #[test]
    fn score_is_symmetric() {
        let ab = token_sort_ratio("some case study", "some other study");
        let ba = token_sort_ratio("some other study", "some case study");
        assert_eq!(ab, ba);
    }

    #[test]
    fn prepared_ratio_matches_wrapper() {
        let a = "The quick brown fox";
        let b = "fox brown quick The";
        assert_eq!(
            token_sort_ratio(a, b),
            ratio(&token_sort_key(a), &token_sort_key(b))
        );
    }
}
