//! TextDupe - Approximate Text-Record Deduplication Engine
//!
//! Removes exact and near-duplicate entries from large collections of
//! free-text records before the data is published for downstream use.
//!
//! The pipeline per split: exact dedup on byte-identical keys, an external
//! sort by ascending key length to localize likely near-duplicates, then
//! multiple passes of windowed, parallel fuzzy comparison with decaying
//! thresholds and growing window sizes until no more duplicates are found
//! or the pass budget runs out. A structured telemetry report accompanies
//! every run.
//!
//! Loading datasets, parsing flags and publishing results are the host
//! tool's business: the engine consumes ordered record sequences per named
//! split plus a dedup-key accessor, and yields the filtered sequences.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use textdupe::config::EngineConfig;
//! use textdupe::engine::Engine;
//! use textdupe::record::Keyed;
//!
//! let engine = Engine::new(EngineConfig::default())?;
//!
//! let mut splits = BTreeMap::new();
//! splits.insert(
//!     "english".to_string(),
//!     vec![
//!         Keyed::new("hello world", 1u32),
//!         Keyed::new("hello world!", 2),
//!         Keyed::new("completely different text", 3),
//!     ],
//! );
//!
//! let output = engine.dedupe_splits(splits)?;
//! assert_eq!(output.splits["english"].len(), 2);
//! println!("{}", output.report.summary());
//! # Ok::<(), textdupe::error::EngineError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod exact;
pub mod fuzzy;
pub mod logging;
pub mod progress;
pub mod record;
pub mod similarity;
pub mod sort;
pub mod telemetry;
