//! Sorted runs: ordered record sources pending merge.
//!
//! A run is either a sorted in-memory vector or a spooled tempfile of
//! JSON-lines records. Spooled storage is anonymous and reclaimed by the OS
//! when the run is dropped after merging.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::EngineError;
use crate::record::DedupRecord;

/// Comparison length of a record's key, in characters.
///
/// A missing key sorts as length 0, ahead of every real key.
pub(crate) fn key_len<R: DedupRecord>(record: &R) -> usize {
    record
        .dedup_key()
        .map(|k| k.chars().count())
        .unwrap_or_default()
}

/// One sorted run, consumable front to back.
#[derive(Debug)]
pub(crate) enum Run<R> {
    /// Sorted records held in memory.
    Memory(std::vec::IntoIter<R>),
    /// Sorted records spooled to a tempfile.
    Spooled(SpooledReader<R>),
}

impl<R: DeserializeOwned> Run<R> {
    /// Spool a sorted chunk to disk and return a disk-backed run.
    ///
    /// # Errors
    ///
    /// Any write failure is fatal ([`EngineError::RunIo`]); a partial run is
    /// never returned.
    pub(crate) fn spool(records: Vec<R>, spool_dir: Option<&Path>) -> Result<Self, EngineError>
    where
        R: Serialize,
    {
        let file = match spool_dir {
            Some(dir) => tempfile::tempfile_in(dir),
            None => tempfile::tempfile(),
        }?;

        let mut writer = BufWriter::new(file);
        for record in &records {
            // An encode failure surfaces as a failed run write
            let line = serde_json::to_string(record)
                .map_err(|source| EngineError::RunIo {
                    source: std::io::Error::other(source),
                })?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }

        let mut file = writer
            .into_inner()
            .map_err(|e| EngineError::RunIo {
                source: e.into_error(),
            })?;
        file.seek(SeekFrom::Start(0))?;

        log::debug!("spooled run of {} records", records.len());
        Ok(Self::Spooled(SpooledReader {
            lines: BufReader::new(file).lines(),
            _marker: PhantomData,
        }))
    }

    /// Next record in run order, if any.
    pub(crate) fn next_record(&mut self) -> Result<Option<R>, EngineError> {
        match self {
            Self::Memory(iter) => Ok(iter.next()),
            Self::Spooled(reader) => reader.next_record(),
        }
    }
}

/// Buffered line reader over a spooled run.
#[derive(Debug)]
pub(crate) struct SpooledReader<R> {
    lines: Lines<BufReader<File>>,
    _marker: PhantomData<R>,
}

impl<R: DeserializeOwned> SpooledReader<R> {
    fn next_record(&mut self) -> Result<Option<R>, EngineError> {
        match self.lines.next() {
            None => Ok(None),
            Some(Err(source)) => Err(EngineError::RunIo { source }),
            Some(Ok(line)) => Ok(Some(serde_json::from_str(&line)?)),
        }
    }
}
