//! Error taxonomy and non-fatal split warnings.

use serde::Serialize;

/// Errors that abort an engine run.
///
/// All variants are fatal: they unwind to the top-level engine call with no
/// partial output for the affected split. The caller decides whether to
/// retry, skip the split, or abort the batch.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// A configuration parameter is invalid. Raised by [`crate::engine::Engine::new`]
    /// before any records are touched.
    #[error("invalid configuration `{field}`: {reason}")]
    Config {
        /// The offending configuration field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// I/O failure while writing or reading a spooled sort run.
    ///
    /// A corrupt or partial run would silently break the downstream
    /// length-ordering invariant, so the whole sort aborts instead.
    #[error("I/O failure on spooled sort run: {source}")]
    RunIo {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A spooled run produced a record that could not be decoded.
    #[error("corrupt record in spooled sort run: {source}")]
    RunDecode {
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A worker failed inside a window's comparison scan.
    ///
    /// Carries the window's position for diagnosis. Fatal to the owning pass
    /// and therefore to the run.
    #[error("fuzzy worker failed in pass {pass}, window {window}: {message}")]
    Worker {
        /// Zero-based pass index.
        pass: usize,
        /// Zero-based window index within the pass.
        window: usize,
        /// Panic payload or failure description.
        message: String,
    },
}

impl From<serde_json::Error> for EngineError {
    fn from(source: serde_json::Error) -> Self {
        Self::RunDecode { source }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(source: std::io::Error) -> Self {
        Self::RunIo { source }
    }
}

/// Non-fatal conditions recorded in a split's telemetry.
///
/// Warnings never interrupt processing; sibling splits continue regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitWarning {
    /// The split had zero usable records after key validation. Its output is
    /// an empty sequence with zero-valued telemetry.
    Empty,
    /// Records were skipped because their dedup key was missing or empty.
    MissingKeys {
        /// How many records were dropped.
        skipped: usize,
    },
    /// Records were skipped because their key was shorter than the
    /// configured minimum length.
    ShortKeys {
        /// How many records were dropped.
        skipped: usize,
    },
}
