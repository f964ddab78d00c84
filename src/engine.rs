//! The engine: four stages wired together per split.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{EngineError, SplitWarning};
use crate::exact::dedupe_exact;
use crate::fuzzy::dedupe_fuzzy;
use crate::record::DedupRecord;
use crate::sort::sort_by_key_length;
use crate::telemetry::{EngineReport, SplitTelemetry};

/// Filtered splits plus the run's telemetry report.
#[derive(Debug)]
pub struct DedupeOutput<R> {
    /// Surviving records per split, order-preserving.
    pub splits: BTreeMap<String, Vec<R>>,
    /// Telemetry for every processed split.
    pub report: EngineReport,
}

/// Approximate deduplication engine.
///
/// Runs the full pipeline per split: exact dedup, length-ordered sort,
/// multi-pass windowed fuzzy matching, telemetry. Splits are processed
/// independently; records never compare across splits.
///
/// # Example
///
/// ```
/// use textdupe::config::EngineConfig;
/// use textdupe::engine::Engine;
///
/// let engine = Engine::new(
///     EngineConfig::default()
///         .with_initial_threshold(80.0)
///         .with_max_passes(2),
/// )?;
///
/// let records = vec![
///     "hello world".to_string(),
///     "hello world!".to_string(),
///     "completely different text".to_string(),
/// ];
/// let (kept, telemetry) = engine.dedupe_split("default", records)?;
///
/// assert_eq!(kept.len(), 2);
/// assert_eq!(telemetry.original, 3);
/// # Ok::<(), textdupe::error::EngineError>(())
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine, validating the configuration up front.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] for any invalid parameter; nothing is
    /// processed with a bad configuration.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Deduplicate one split.
    ///
    /// A split with zero usable records after key validation is not an
    /// error: its output is empty, and [`SplitWarning::Empty`] is recorded
    /// in the telemetry.
    ///
    /// # Errors
    ///
    /// Fatal stage errors ([`EngineError::RunIo`], [`EngineError::RunDecode`],
    /// [`EngineError::Worker`]) abort the split with no partial output.
    pub fn dedupe_split<R>(
        &self,
        name: &str,
        records: Vec<R>,
    ) -> Result<(Vec<R>, SplitTelemetry), EngineError>
    where
        R: DedupRecord + Serialize + DeserializeOwned + Send + Sync,
    {
        let start = Instant::now();
        let original = records.len();
        log::info!("processing split '{name}' ({original} records)");
        if let Some(ref progress) = self.config.progress {
            progress.on_split_start(name, original);
        }

        let mut warnings = Vec::new();

        if let Some(ref progress) = self.config.progress {
            progress.on_stage_start("exact");
        }
        let (kept, exact) = dedupe_exact(records, self.config.min_key_length);
        if exact.missing_keys > 0 {
            warnings.push(SplitWarning::MissingKeys {
                skipped: exact.missing_keys,
            });
        }
        if exact.short_keys > 0 {
            warnings.push(SplitWarning::ShortKeys {
                skipped: exact.short_keys,
            });
        }

        if kept.is_empty() {
            log::warn!("split '{name}' has no usable records");
            warnings.push(SplitWarning::Empty);
            let telemetry = SplitTelemetry {
                original,
                exact,
                warnings,
                elapsed: start.elapsed(),
                ..Default::default()
            };
            if let Some(ref progress) = self.config.progress {
                progress.on_split_end(name, 0);
            }
            return Ok((kept, telemetry));
        }

        if let Some(ref progress) = self.config.progress {
            progress.on_stage_start("sort");
        }
        let (sorted, sort) = sort_by_key_length(
            kept,
            self.config.max_in_memory_run_size,
            self.config.spool_dir.as_deref(),
        )?;

        if let Some(ref progress) = self.config.progress {
            progress.on_stage_start("fuzzy");
        }
        let (survivors, passes) = dedupe_fuzzy(sorted, &self.config)?;

        let telemetry = SplitTelemetry {
            original,
            exact,
            sort,
            passes,
            final_count: survivors.len(),
            elapsed: start.elapsed(),
            warnings,
        };
        log::info!(
            "split '{name}' complete: {} -> {} records ({:.1}% reduction) in {:.2?}",
            original,
            survivors.len(),
            telemetry.reduction_percent(),
            telemetry.elapsed
        );
        if let Some(ref progress) = self.config.progress {
            progress.on_split_end(name, survivors.len());
        }

        Ok((survivors, telemetry))
    }

    /// Deduplicate every split, in split-name order.
    ///
    /// # Errors
    ///
    /// The first fatal error aborts the whole call. Callers wanting to skip
    /// a failing split and continue should drive [`Engine::dedupe_split`]
    /// per split instead.
    pub fn dedupe_splits<R>(
        &self,
        splits: BTreeMap<String, Vec<R>>,
    ) -> Result<DedupeOutput<R>, EngineError>
    where
        R: DedupRecord + Serialize + DeserializeOwned + Send + Sync,
    {
        let mut report = EngineReport::new();
        let mut out = BTreeMap::new();

        for (name, records) in splits {
            let (survivors, telemetry) = self.dedupe_split(&name, records)?;
            report.record_split(name.clone(), telemetry);
            out.insert(name, survivors);
        }

        log::info!("{}", report.summary());
        Ok(DedupeOutput {
            splits: out,
            report,
        })
    }
}
