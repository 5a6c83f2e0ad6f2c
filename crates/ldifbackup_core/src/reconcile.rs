//! Snapshot reconciliation.
//!
//! After a run the output directory holds exactly the files written this
//! time, plus stale files from entries that no longer exist. The
//! reconciler compares the two sets and drives the version store:
//!
//! - `to_add = current` (staging is idempotent, so every file is re-staged)
//! - `to_remove = prior - current`
//!
//! `prior` is limited by a [`SnapshotScope`] to the files this tool
//! manages, so unrelated tracked files such as a README are left alone.

use crate::config::{OutputMode, StoreActions};
use crate::error::CoreResult;
use crate::writer::FileSet;
use ldifbackup_store::VersionStore;
use serde::Serialize;
use tracing::{debug, info};

/// The set of snapshot files a run is responsible for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotScope {
    suffix: Option<String>,
    aggregate: Option<String>,
}

impl SnapshotScope {
    /// Scope of the given output mode.
    ///
    /// Per-entry mode manages every top-level `*.<extension>` file.
    /// Aggregate mode manages its own file plus top-level files sharing its
    /// extension, so switching from per-entry to aggregate output cleans up
    /// the old per-entry files.
    #[must_use]
    pub fn for_mode(mode: &OutputMode) -> Self {
        match mode {
            OutputMode::PerEntry { extension } => Self {
                suffix: Some(format!(".{extension}")),
                aggregate: None,
            },
            OutputMode::Aggregate { file_name } => Self {
                suffix: file_name
                    .rsplit_once('.')
                    .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
                    .map(|(_, ext)| format!(".{ext}")),
                aggregate: Some(file_name.clone()),
            },
        }
    }

    /// Returns true if `name` is managed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        if name.contains('/') {
            return false;
        }
        if self.aggregate.as_deref() == Some(name) {
            return true;
        }
        self.suffix
            .as_deref()
            .is_some_and(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
    }

    /// Keeps the managed names of `tracked`.
    #[must_use]
    pub fn restrict(&self, tracked: impl IntoIterator<Item = String>) -> FileSet {
        tracked.into_iter().filter(|name| self.contains(name)).collect()
    }
}

/// The two file sets being compared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilerInputs {
    /// Managed files in the latest snapshot.
    pub prior: FileSet,
    /// Files written this run.
    pub current: FileSet,
}

impl ReconcilerInputs {
    /// Creates inputs from the two sets.
    #[must_use]
    pub fn new(prior: FileSet, current: FileSet) -> Self {
        Self { prior, current }
    }

    /// Computes the add and remove sets.
    #[must_use]
    pub fn reconcile(&self) -> Reconciliation {
        Reconciliation {
            to_add: self.current.clone(),
            to_remove: self.prior.difference(&self.current).cloned().collect(),
        }
    }
}

/// Store changes needed to make the snapshot match the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Files to stage.
    pub to_add: FileSet,
    /// Files to unstage and delete.
    pub to_remove: FileSet,
}

/// What [`Reconciliation::apply`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreOutcome {
    /// Files passed to `stage`.
    pub staged: usize,
    /// Files passed to `unstage_and_delete`.
    pub removed: usize,
    /// A snapshot was created.
    pub committed: bool,
    /// The store was compacted.
    pub compacted: bool,
}

impl Reconciliation {
    /// Drives `store` with the enabled actions, in the order stage, remove,
    /// commit, compact.
    ///
    /// Empty sets are not passed to the store. Errors are returned as-is.
    ///
    /// # Errors
    ///
    /// Returns the first store error.
    pub fn apply<V: VersionStore + ?Sized>(
        &self,
        store: &mut V,
        actions: &StoreActions,
    ) -> CoreResult<StoreOutcome> {
        let mut outcome = StoreOutcome::default();

        if actions.stage && !self.to_add.is_empty() {
            let files: Vec<String> = self.to_add.iter().cloned().collect();
            store.stage(&files)?;
            outcome.staged = files.len();
        }

        if actions.remove && !self.to_remove.is_empty() {
            let files: Vec<String> = self.to_remove.iter().cloned().collect();
            for name in &files {
                debug!(file = %name, "removing stale file");
            }
            store.unstage_and_delete(&files)?;
            outcome.removed = files.len();
        }

        if actions.commit {
            outcome.committed = store.commit(&actions.message)?;
            if !outcome.committed {
                info!("snapshot unchanged, nothing committed");
            }
        }

        if actions.compact {
            store.compact()?;
            outcome.compacted = true;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldifbackup_store::{MemoryStore, StoreCall};

    fn set(names: &[&str]) -> FileSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reconcile_arithmetic() {
        let r = ReconcilerInputs::new(set(&["a.ldif", "b.ldif"]), set(&["b.ldif", "c.ldif"]))
            .reconcile();
        assert_eq!(r.to_add, set(&["b.ldif", "c.ldif"]));
        assert_eq!(r.to_remove, set(&["a.ldif"]));
    }

    #[test]
    fn reconcile_empty_prior() {
        let r = ReconcilerInputs::new(FileSet::new(), set(&["a.ldif"])).reconcile();
        assert_eq!(r.to_add, set(&["a.ldif"]));
        assert!(r.to_remove.is_empty());
    }

    #[test]
    fn reconcile_empty_current_removes_everything() {
        let r = ReconcilerInputs::new(set(&["a.ldif"]), FileSet::new()).reconcile();
        assert!(r.to_add.is_empty());
        assert_eq!(r.to_remove, set(&["a.ldif"]));
    }

    #[test]
    fn scope_per_entry() {
        let scope = SnapshotScope::for_mode(&OutputMode::per_entry());
        assert!(scope.contains("U1.ldif"));
        assert!(!scope.contains("README.md"));
        assert!(!scope.contains(".ldif"));
        assert!(!scope.contains("sub/U1.ldif"));
        assert_eq!(
            scope.restrict(set(&["a.ldif", "README.md", ".gitignore"])),
            set(&["a.ldif"])
        );
    }

    #[test]
    fn scope_aggregate() {
        let scope = SnapshotScope::for_mode(&OutputMode::aggregate("all.ldif"));
        assert!(scope.contains("all.ldif"));
        assert!(scope.contains("U1.ldif"));
        assert!(!scope.contains("notes.txt"));

        let bare = SnapshotScope::for_mode(&OutputMode::aggregate("dump"));
        assert!(bare.contains("dump"));
        assert!(!bare.contains("U1.ldif"));
    }

    #[test]
    fn apply_calls_in_order() {
        let mut store = MemoryStore::with_tracked(["a.ldif", "b.ldif"]);
        let r = ReconcilerInputs::new(set(&["a.ldif", "b.ldif"]), set(&["b.ldif", "c.ldif"]))
            .reconcile();

        let outcome = r.apply(&mut store, &StoreActions::default()).unwrap();
        assert_eq!(outcome.staged, 2);
        assert_eq!(outcome.removed, 1);
        assert!(outcome.committed);
        assert!(!outcome.compacted);

        assert_eq!(
            store.calls(),
            &[
                StoreCall::Stage(vec!["b.ldif".into(), "c.ldif".into()]),
                StoreCall::UnstageAndDelete(vec!["a.ldif".into()]),
                StoreCall::Commit("ldif-git-backup snapshot".into()),
            ]
        );
    }

    #[test]
    fn apply_honours_each_flag() {
        let r = ReconcilerInputs::new(set(&["a.ldif"]), set(&["b.ldif"])).reconcile();

        let mut store = MemoryStore::new();
        let outcome = r.apply(&mut store, &StoreActions::none()).unwrap();
        assert_eq!(outcome, StoreOutcome::default());
        assert!(store.calls().is_empty());

        let mut store = MemoryStore::new();
        let actions = StoreActions {
            remove: false,
            commit: false,
            compact: true,
            ..StoreActions::default()
        };
        r.apply(&mut store, &actions).unwrap();
        assert_eq!(
            store.calls(),
            &[StoreCall::Stage(vec!["b.ldif".into()]), StoreCall::Compact]
        );
    }

    #[test]
    fn apply_unchanged_snapshot_does_not_commit() {
        let mut store = MemoryStore::with_tracked(["a.ldif"]);
        let r = ReconcilerInputs::new(set(&["a.ldif"]), set(&["a.ldif"])).reconcile();
        let outcome = r.apply(&mut store, &StoreActions::default()).unwrap();
        assert!(!outcome.committed);
        assert!(store.commits().is_empty());
    }
}
