//! Version store trait definition.

use crate::error::StoreResult;
use std::collections::BTreeSet;

/// A versioned snapshot of the output directory.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (git, in-memory for testing, etc.).
///
/// # Invariants
///
/// - Names are relative to the output directory and use `/` separators
/// - `stage` is idempotent: staging an unchanged file is a no-op
/// - `unstage_and_delete` tolerates names that are already gone
/// - Errors are reported as-is; stores never retry
pub trait VersionStore {
    /// Returns every file name recorded in the latest snapshot.
    fn tracked(&self) -> StoreResult<BTreeSet<String>>;

    /// Stages the given files for the next snapshot.
    fn stage(&mut self, files: &[String]) -> StoreResult<()>;

    /// Removes the given files from the next snapshot and from disk.
    fn unstage_and_delete(&mut self, files: &[String]) -> StoreResult<()>;

    /// Records the staged changes as a new snapshot.
    ///
    /// Returns `false` without creating a snapshot when nothing is staged.
    fn commit(&mut self, message: &str) -> StoreResult<bool>;

    /// Compacts the store's history.
    fn compact(&mut self) -> StoreResult<()>;
}

impl<V: VersionStore + ?Sized> VersionStore for &mut V {
    fn tracked(&self) -> StoreResult<BTreeSet<String>> {
        (**self).tracked()
    }

    fn stage(&mut self, files: &[String]) -> StoreResult<()> {
        (**self).stage(files)
    }

    fn unstage_and_delete(&mut self, files: &[String]) -> StoreResult<()> {
        (**self).unstage_and_delete(files)
    }

    fn commit(&mut self, message: &str) -> StoreResult<bool> {
        (**self).commit(message)
    }

    fn compact(&mut self) -> StoreResult<()> {
        (**self).compact()
    }
}
