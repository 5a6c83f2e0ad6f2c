//! In-memory version store for testing.

use crate::error::StoreResult;
use crate::store::VersionStore;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One call received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `stage` with the given names.
    Stage(Vec<String>),
    /// `unstage_and_delete` with the given names.
    UnstageAndDelete(Vec<String>),
    /// `commit` with the given message.
    Commit(String),
    /// `compact`.
    Compact,
}

/// A version store kept entirely in memory.
///
/// This store is suitable for:
/// - Unit tests of reconciliation
/// - Integration tests of the full pipeline without a `git` binary
///
/// Staging a name that is already tracked counts as no change, so a second
/// identical run produces no snapshot. When created with [`MemoryStore::rooted`],
/// removed names are also deleted from that directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    root: Option<PathBuf>,
    tracked: BTreeSet<String>,
    staged: BTreeSet<String>,
    removed: BTreeSet<String>,
    commits: Vec<String>,
    calls: Vec<StoreCall>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose latest snapshot holds `names`.
    #[must_use]
    pub fn with_tracked<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tracked: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Deletes removed files from `root` in addition to untracking them.
    #[must_use]
    pub fn rooted(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Messages of all snapshots created so far, oldest first.
    #[must_use]
    pub fn commits(&self) -> &[String] {
        &self.commits
    }

    /// Every call received, in order.
    #[must_use]
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }
}

impl VersionStore for MemoryStore {
    fn tracked(&self) -> StoreResult<BTreeSet<String>> {
        Ok(self.tracked.clone())
    }

    fn stage(&mut self, files: &[String]) -> StoreResult<()> {
        self.calls.push(StoreCall::Stage(files.to_vec()));
        for name in files {
            self.removed.remove(name);
            if !self.tracked.contains(name) {
                self.staged.insert(name.clone());
            }
        }
        Ok(())
    }

    fn unstage_and_delete(&mut self, files: &[String]) -> StoreResult<()> {
        self.calls.push(StoreCall::UnstageAndDelete(files.to_vec()));
        for name in files {
            self.staged.remove(name);
            if self.tracked.contains(name) {
                self.removed.insert(name.clone());
            }
            if let Some(root) = &self.root {
                match std::fs::remove_file(root.join(name)) {
                    Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn commit(&mut self, message: &str) -> StoreResult<bool> {
        self.calls.push(StoreCall::Commit(message.to_string()));
        if self.staged.is_empty() && self.removed.is_empty() {
            return Ok(false);
        }

        self.tracked.extend(std::mem::take(&mut self.staged));
        for name in std::mem::take(&mut self.removed) {
            self.tracked.remove(&name);
        }
        self.commits.push(message.to_string());
        Ok(true)
    }

    fn compact(&mut self) -> StoreResult<()> {
        self.calls.push(StoreCall::Compact);
        Ok(())
    }
}
