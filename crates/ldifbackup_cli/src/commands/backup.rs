//! Backup command implementation.

use crate::config::Resolved;
use ldifbackup_core::{open_source, Pipeline};
use ldifbackup_store::{GitStore, MemoryStore, StoreError, StoreResult};
use std::path::Path;
use tracing::info;

/// Runs the backup command: split the dump, then snapshot the output
/// directory in git.
pub fn run(resolved: &Resolved, init: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = &resolved.config;
    let dry_run = config.writer.suppress;
    let pipeline = Pipeline::new(config)?;

    // The repository is opened before the source so a bad output directory
    // never starts the dump command.
    let store = open_repository(config.output_dir(), init, dry_run)?;
    let source = open_source(&resolved.source)?;

    let summary = match store {
        Some(mut store) => pipeline.run(source, &mut store)?,
        None => {
            info!("dry run: no repository yet, comparing against an empty snapshot");
            pipeline.run(source, &mut MemoryStore::new())?
        }
    };
    super::report(&summary, json)
}

/// Opens the repository in `dir`.
///
/// Returns `None` for a dry run against a directory that is not a
/// repository yet.
fn open_repository(dir: &Path, init: bool, dry_run: bool) -> StoreResult<Option<GitStore>> {
    match GitStore::open(dir) {
        Ok(store) => Ok(Some(store)),
        Err(StoreError::NotARepository { .. }) if dry_run => Ok(None),
        Err(StoreError::NotARepository { .. }) if init => {
            info!(dir = %dir.display(), "initialising repository");
            GitStore::init(dir).map(Some)
        }
        Err(e) => Err(e),
    }
}
