//! Entry persistence.
//!
//! The writer owns the output directory for the duration of a run:
//!
//! ```text
//! <output_dir>/
//! ├─ <key>.ldif        # per-entry mode: one file per entry, rewritten each run
//! ├─ <key>.ldif
//! └─ all.ldif          # aggregate mode: every entry in input order
//! ```
//!
//! Per-entry files are opened, written and closed before the next entry
//! is accepted. The aggregate file is opened once and held until
//! [`EntryWriter::finish`].

use crate::config::{MissingKeyPolicy, OutputMode, WriterConfig};
use crate::entry::Entry;
use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Names of the files produced during one run, relative to the output
/// directory.
pub type FileSet = BTreeSet<String>;

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The entry was persisted (or, when suppressed, accounted for) in
    /// this file.
    Written(String),
    /// The entry had no key and was dropped under
    /// [`MissingKeyPolicy::Skip`].
    Skipped,
    /// The entry had no attributes and no key, as produced by a repeated
    /// or trailing blank line. Nothing is written.
    Empty,
}

/// Writer counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriterStats {
    /// Entries persisted.
    pub entries_written: u64,
    /// Entries dropped for lack of a key.
    pub entries_skipped: u64,
    /// Attribute-less entries passed over.
    pub empty_entries: u64,
    /// Per-entry files written more than once because keys repeated.
    pub duplicate_keys: u64,
    /// Bytes written to disk. Zero when output is suppressed.
    pub bytes_written: u64,
}

/// Everything the writer hands back when the run's input is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterOutput {
    /// Files produced this run.
    pub files: FileSet,
    /// Counters.
    pub stats: WriterStats,
}

/// Persists completed entries.
pub struct EntryWriter {
    dir: PathBuf,
    mode: OutputMode,
    key_attribute: String,
    missing_key: MissingKeyPolicy,
    suppress: bool,
    aggregate: Option<BufWriter<File>>,
    files: FileSet,
    stats: WriterStats,
}

impl EntryWriter {
    /// Creates a writer.
    ///
    /// `key_attribute` only appears in missing-key errors. In aggregate
    /// mode the aggregate file is created (truncated) here, unless output
    /// is suppressed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the aggregate file cannot be created.
    pub fn new(config: &WriterConfig, key_attribute: &str) -> CoreResult<Self> {
        let mut files = FileSet::new();
        let mut aggregate = None;

        if let OutputMode::Aggregate { file_name } = &config.mode {
            if !config.suppress {
                let file = File::create(config.output_dir.join(file_name))?;
                aggregate = Some(BufWriter::new(file));
            }
            files.insert(file_name.clone());
        }

        Ok(Self {
            dir: config.output_dir.clone(),
            mode: config.mode.clone(),
            key_attribute: key_attribute.to_string(),
            missing_key: config.missing_key,
            suppress: config.suppress,
            aggregate,
            files,
            stats: WriterStats::default(),
        })
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files produced so far.
    #[must_use]
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Persists one entry.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingKey`] in per-entry mode when the entry has no
    ///   key and the policy is [`MissingKeyPolicy::Abort`]
    /// - [`CoreError::InvalidKey`] when the key cannot name a file
    /// - [`CoreError::Io`] when writing fails
    ///
    /// Empty entries are never an error and write nothing in either mode.
    pub fn write(&mut self, entry: &Entry) -> CoreResult<WriteOutcome> {
        if entry.is_empty() && entry.key().is_none() {
            self.stats.empty_entries += 1;
            debug!("empty entry, nothing to write");
            return Ok(WriteOutcome::Empty);
        }

        let file_name = match &self.mode {
            OutputMode::Aggregate { file_name } => {
                if let Some(out) = self.aggregate.as_mut() {
                    let text = entry.to_ldif();
                    out.write_all(text.as_bytes())?;
                    self.stats.bytes_written += text.len() as u64;
                }
                file_name.clone()
            }
            OutputMode::PerEntry { extension } => {
                let Some(key) = entry.key() else {
                    return match self.missing_key {
                        MissingKeyPolicy::Abort => Err(CoreError::MissingKey {
                            key_attribute: self.key_attribute.clone(),
                            entry: entry.describe(),
                        }),
                        MissingKeyPolicy::Skip => {
                            self.stats.entries_skipped += 1;
                            warn!(
                                entry = %entry.describe(),
                                key_attribute = %self.key_attribute,
                                "entry has no key attribute, skipped"
                            );
                            Ok(WriteOutcome::Skipped)
                        }
                    };
                };
                if !key.is_safe_file_stem() {
                    return Err(CoreError::InvalidKey {
                        key: key.as_str().to_string(),
                    });
                }

                let file_name = format!("{key}.{extension}");
                if !self.files.insert(file_name.clone()) {
                    self.stats.duplicate_keys += 1;
                    debug!(file = %file_name, "duplicate key, overwriting earlier entry");
                }
                if !self.suppress {
                    let text = entry.to_ldif();
                    let mut file = File::create(self.dir.join(&file_name))?;
                    file.write_all(text.as_bytes())?;
                    self.stats.bytes_written += text.len() as u64;
                }
                file_name
            }
        };

        self.stats.entries_written += 1;
        Ok(WriteOutcome::Written(file_name))
    }

    /// Flushes and closes the aggregate file, returning the file set.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the final flush fails.
    pub fn finish(mut self) -> CoreResult<WriterOutput> {
        if let Some(mut out) = self.aggregate.take() {
            out.flush()?;
        }
        Ok(WriterOutput {
            files: self.files,
            stats: self.stats,
        })
    }
}
