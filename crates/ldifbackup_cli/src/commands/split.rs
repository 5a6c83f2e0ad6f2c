//! Split command implementation.

use crate::config::Resolved;
use ldifbackup_core::{open_source, Pipeline};

/// Runs the split command: segment and write, no version store.
pub fn run(resolved: &Resolved, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(&resolved.config)?;
    let source = open_source(&resolved.source)?;
    let summary = pipeline.run_without_store(source)?;
    super::report(&summary, json)
}
