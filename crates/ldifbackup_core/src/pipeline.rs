//! One backup run, end to end.
//!
//! ```text
//! LineSource ─► Segmenter ─► EntryWriter ─► FileSet ─┐
//!                                                     ├─► Reconciliation ─► VersionStore
//! VersionStore::tracked ─► SnapshotScope ─► prior ───┘
//! ```
//!
//! The prior snapshot is read before any file is written. A fatal error
//! while segmenting or writing returns before the store is changed, so an
//! aborted run never commits.

use crate::config::RunConfig;
use crate::error::{CoreError, CoreResult};
use crate::filter::AttributeFilter;
use crate::reconcile::{ReconcilerInputs, Reconciliation, SnapshotScope, StoreOutcome};
use crate::segmenter::{Segmenter, SegmenterStats};
use crate::writer::{EntryWriter, WriterOutput, WriterStats};
use ldifbackup_source::{LineSource, SourceError, SourceSpec};
use ldifbackup_store::VersionStore;
use serde::Serialize;
use std::fs;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Opens the configured input.
///
/// A file that cannot be opened is a configuration error; a command that
/// cannot be started is an upstream error.
///
/// # Errors
///
/// See above.
pub fn open_source(spec: &SourceSpec) -> CoreResult<Box<dyn LineSource>> {
    spec.open().map_err(|e| match e {
        SourceError::Open { .. } => CoreError::config(e.to_string()),
        other => CoreError::Source(other),
    })
}

/// Result of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Segmenter counters.
    pub segmenter: SegmenterStats,
    /// Writer counters.
    pub writer: WriterStats,
    /// Declared LDIF version, for versioned input.
    pub version: Option<String>,
    /// Files produced this run.
    pub files: usize,
    /// Files that would be (or were) staged.
    pub to_add: usize,
    /// Files that would be (or were) removed.
    pub to_remove: usize,
    /// What the store actually did. `None` for dry runs and store-less runs.
    pub store: Option<StoreOutcome>,
    /// Output was suppressed.
    pub dry_run: bool,
    /// Time spent segmenting and writing.
    pub segment_time: Duration,
    /// Time spent reading the prior snapshot and applying changes.
    pub store_time: Duration,
}

impl RunSummary {
    /// True if a snapshot was created.
    #[must_use]
    pub fn committed(&self) -> bool {
        self.store.as_ref().is_some_and(|s| s.committed)
    }
}

/// A validated run configuration, ready to process input.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RunConfig,
    filter: AttributeFilter,
}

impl Pipeline {
    /// Validates `config` and prepares the output directory.
    ///
    /// The directory is created when missing, except for dry runs which
    /// touch nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] for invalid settings, or an I/O error if
    /// the directory cannot be created.
    pub fn new(config: &RunConfig) -> CoreResult<Self> {
        config.validate()?;
        let filter = AttributeFilter::new(&config.segmenter.exclude)?;

        if !config.writer.suppress {
            fs::create_dir_all(config.output_dir())?;
        }

        Ok(Self {
            config: config.clone(),
            filter,
        })
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Segments and writes `source`, then reconciles against `store`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Files already written stay on disk.
    pub fn run<S, V>(&self, source: S, store: &mut V) -> CoreResult<RunSummary>
    where
        S: LineSource,
        V: VersionStore + ?Sized,
    {
        let scope = SnapshotScope::for_mode(&self.config.writer.mode);

        let start = Instant::now();
        let prior = scope.restrict(store.tracked()?);
        let mut store_time = start.elapsed();
        debug!(prior = prior.len(), "read prior snapshot");

        let (mut summary, output) = self.segment_and_write(source)?;

        let start = Instant::now();
        let reconciliation = ReconcilerInputs::new(prior, output.files).reconcile();
        summary.to_add = reconciliation.to_add.len();
        summary.to_remove = reconciliation.to_remove.len();

        if self.config.writer.suppress {
            log_dry_run(&reconciliation);
        } else {
            let outcome = reconciliation.apply(store, &self.config.store)?;
            info!(
                staged = outcome.staged,
                removed = outcome.removed,
                committed = outcome.committed,
                "snapshot updated"
            );
            summary.store = Some(outcome);
        }
        store_time += start.elapsed();
        summary.store_time = store_time;

        Ok(summary)
    }

    /// Segments and writes `source` without a version store.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error.
    pub fn run_without_store<S: LineSource>(&self, source: S) -> CoreResult<RunSummary> {
        let (mut summary, output) = self.segment_and_write(source)?;
        summary.to_add = output.files.len();
        Ok(summary)
    }

    fn segment_and_write<S: LineSource>(&self, source: S) -> CoreResult<(RunSummary, WriterOutput)> {
        let config = &self.config;
        let start = Instant::now();
        info!(
            source = %source.describe(),
            dialect = %config.segmenter.dialect,
            dir = %config.output_dir().display(),
            "segmenting"
        );

        let mut segmenter = Segmenter::with_filter(
            source,
            &config.segmenter,
            &config.writer.mode,
            self.filter.clone(),
        )?;
        let mut writer = EntryWriter::new(&config.writer, &config.segmenter.key_attribute)?;

        while let Some(entry) = segmenter.next_entry()? {
            writer.write(&entry)?;
        }

        let output = writer.finish()?;
        let segment_time = start.elapsed();
        info!(
            entries = segmenter.stats().entries,
            written = output.stats.entries_written,
            skipped = output.stats.entries_skipped,
            files = output.files.len(),
            elapsed_ms = segment_time.as_millis() as u64,
            "segmentation complete"
        );

        let summary = RunSummary {
            segmenter: segmenter.stats().clone(),
            writer: output.stats.clone(),
            version: segmenter.version().map(str::to_string),
            files: output.files.len(),
            dry_run: config.writer.suppress,
            segment_time,
            ..RunSummary::default()
        };
        Ok((summary, output))
    }
}

fn log_dry_run(reconciliation: &Reconciliation) {
    for name in &reconciliation.to_remove {
        debug!(file = %name, "dry run: would remove");
    }
    info!(
        to_add = reconciliation.to_add.len(),
        to_remove = reconciliation.to_remove.len(),
        "dry run: store left untouched"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Dialect, MissingKeyPolicy, OutputMode, SegmenterConfig, WriterConfig};
    use ldifbackup_source::MemorySource;
    use ldifbackup_store::{MemoryStore, StoreCall};
    use std::path::Path;
    use tempfile::tempdir;

    fn config(dir: &Path) -> RunConfig {
        RunConfig::new(dir).with_segmenter(
            SegmenterConfig::new()
                .dialect(Dialect::Unwrapped)
                .key_attribute("uid"),
        )
    }

    #[test]
    fn pipeline_basic_run_commits() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(&config(dir.path())).unwrap();
        let mut store = MemoryStore::new();

        let summary = pipeline
            .run(MemorySource::new("dn: cn=a\nuid: U1\n\n"), &mut store)
            .unwrap();

        assert_eq!(summary.files, 1);
        assert!(summary.committed());
        assert_eq!(
            fs::read_to_string(dir.path().join("U1.ldif")).unwrap(),
            "dn: cn=a\nuid: U1\n\n"
        );
    }

    #[test]
    fn pipeline_missing_key_aborts_before_store() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(&config(dir.path())).unwrap();
        let mut store = MemoryStore::with_tracked(["old.ldif"]);

        let err = pipeline
            .run(
                MemorySource::new("uid: A\n\ndn: cn=nokey\n\nuid: C\n\n"),
                &mut store,
            )
            .unwrap_err();

        assert!(matches!(err, CoreError::MissingKey { .. }));
        assert!(store.calls().is_empty());
        assert!(dir.path().join("A.ldif").exists());
        assert!(!dir.path().join("C.ldif").exists());
    }

    #[test]
    fn pipeline_skip_policy_continues() {
        let dir = tempdir().unwrap();
        let config = config(dir.path())
            .with_writer(WriterConfig::new(dir.path()).missing_key(MissingKeyPolicy::Skip));
        let mut store = MemoryStore::new();

        let summary = Pipeline::new(&config)
            .unwrap()
            .run(MemorySource::new("uid: A\n\ndn: cn=nokey\n\nuid: C\n\n"), &mut store)
            .unwrap();

        assert_eq!(summary.writer.entries_skipped, 1);
        assert_eq!(summary.files, 2);
    }

    #[test]
    fn pipeline_dry_run_touches_nothing() {
        let parent = tempdir().unwrap();
        let dir = parent.path().join("out");
        let config = config(&dir).with_writer(WriterConfig::new(&dir).suppress(true));
        let mut store = MemoryStore::with_tracked(["old.ldif"]);

        let summary = Pipeline::new(&config)
            .unwrap()
            .run(MemorySource::new("uid: A\n\n"), &mut store)
            .unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.to_add, 1);
        assert_eq!(summary.to_remove, 1);
        assert!(summary.store.is_none());
        assert!(store.calls().is_empty());
        assert!(!dir.exists());
    }

    #[test]
    fn pipeline_removes_stale_managed_files_only() {
        let dir = tempdir().unwrap();
        let mut store = MemoryStore::with_tracked(["gone.ldif", "README.md"]);

        Pipeline::new(&config(dir.path()))
            .unwrap()
            .run(MemorySource::new("uid: A\n\n"), &mut store)
            .unwrap();

        assert_eq!(
            store.calls()[1],
            StoreCall::UnstageAndDelete(vec!["gone.ldif".into()])
        );
        assert!(store.tracked().unwrap().contains("README.md"));
    }

    #[test]
    fn pipeline_aggregate_mode() {
        let dir = tempdir().unwrap();
        let config = config(dir.path())
            .with_writer(WriterConfig::new(dir.path()).mode(OutputMode::aggregate("all.ldif")));

        let summary = Pipeline::new(&config)
            .unwrap()
            .run_without_store(MemorySource::new("dn: cn=a\n\ndn: cn=b\n\n"))
            .unwrap();

        assert_eq!(summary.files, 1);
        assert_eq!(summary.writer.entries_written, 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("all.ldif")).unwrap(),
            "dn: cn=a\n\ndn: cn=b\n\n"
        );
    }

    #[test]
    fn pipeline_rejects_invalid_exclusion_up_front() {
        let dir = tempdir().unwrap();
        let config = config(dir.path())
            .with_segmenter(SegmenterConfig::new().key_attribute("uid").exclude("(("));
        assert!(Pipeline::new(&config).unwrap_err().is_configuration());
    }

    #[test]
    fn open_source_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let spec = SourceSpec::File(dir.path().join("missing.ldif"));
        assert!(matches!(open_source(&spec), Err(e) if e.is_configuration()));
    }
}
