//! Checkpoint store
//!
//! The durable, append-only result file. Previously appended rows are
//! replayed at startup into the processed set, and every new row is flushed
//! before `append` returns so progress survives an external kill mid-run.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

/// Column header written once, only when the file starts empty
pub const OUTPUT_HEADER: [&str; 2] = ["profile_url", "profile_picture_url"];

/// Append-only CSV store keyed by profile URL
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replay the result file into the set of already-processed profile URLs.
    ///
    /// A missing file yields an empty set. The header row is skipped;
    /// malformed or empty rows are skipped silently.
    pub fn load_processed(&self) -> anyhow::Result<HashSet<String>> {
        let mut processed = HashSet::new();

        if !self.path.exists() {
            debug!("No checkpoint file at {}, starting fresh", self.path.display());
            return Ok(processed);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open checkpoint {}", self.path.display()))?;

        for result in reader.records() {
            let Ok(record) = result else { continue };
            if let Some(url) = record.get(0) {
                if !url.is_empty() {
                    processed.insert(url.to_string());
                }
            }
        }

        debug!(
            "Loaded {} processed profiles from {}",
            processed.len(),
            self.path.display()
        );
        Ok(processed)
    }

    /// Append one result row, flushed before returning.
    ///
    /// The header is written first iff the file is currently empty, so a
    /// resumed run never duplicates it.
    pub fn append(&self, profile_url: &str, picture_url: &str) -> anyhow::Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open checkpoint {}", self.path.display()))?;

        let is_empty = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_empty {
            writer.write_record(OUTPUT_HEADER)?;
        }
        writer.write_record([profile_url, picture_url])?;
        writer.flush().context("Failed to flush checkpoint row")?;

        Ok(())
    }
}
