//! Git-backed version store.

use crate::error::{StoreError, StoreResult};
use crate::store::VersionStore;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Maximum number of paths passed to a single `git add` / `git rm`.
const PATHS_PER_CALL: usize = 256;

/// A version store backed by a git repository at the output directory.
///
/// Every operation runs the `git` binary with the repository as its
/// working directory:
///
/// | operation            | command                                   |
/// |----------------------|-------------------------------------------|
/// | `tracked`            | `git ls-files -z`                         |
/// | `stage`              | `git add -- <paths>`                      |
/// | `unstage_and_delete` | `git rm -q --ignore-unmatch -- <paths>`   |
/// | `commit`             | `git commit -q -m <message>`              |
/// | `compact`            | `git gc --quiet`                          |
///
/// Path lists are split into chunks so large directories never exceed the
/// OS argument limit.
#[derive(Debug, Clone)]
pub struct GitStore {
    repo_path: PathBuf,
}

impl GitStore {
    /// Opens an existing repository.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotARepository`] if `repo_path` has no `.git`.
    pub fn open(repo_path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = repo_path.as_ref().to_path_buf();

        if !path.join(".git").exists() {
            return Err(StoreError::NotARepository {
                path: path.display().to_string(),
            });
        }

        Ok(Self { repo_path: path })
    }

    /// Opens the repository at `repo_path`, creating the directory and
    /// running `git init` first when needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or `git init`
    /// fails.
    pub fn init(repo_path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = repo_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)?;

        let store = Self { repo_path: path };
        if !store.repo_path.join(".git").exists() {
            store.run(&["init", "-q"])?;
            debug!(path = %store.repo_path.display(), "initialised git repository");
        }
        Ok(store)
    }

    /// Returns the repository path.
    #[must_use]
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn output(&self, args: &[&str]) -> StoreResult<Output> {
        debug!(args = %args.join(" "), "git");
        Ok(Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()?)
    }

    fn run(&self, args: &[&str]) -> StoreResult<String> {
        let output = self.output(args)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(StoreError::CommandFailed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn run_with_paths(&self, head: &[&str], files: &[String]) -> StoreResult<()> {
        for chunk in files.chunks(PATHS_PER_CALL) {
            let mut args: Vec<&str> = head.to_vec();
            args.push("--");
            args.extend(chunk.iter().map(String::as_str));
            self.run(&args)?;
        }
        Ok(())
    }

    fn has_staged_changes(&self) -> StoreResult<bool> {
        let output = self.output(&["diff", "--cached", "--quiet"])?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(StoreError::CommandFailed {
                args: "diff --cached --quiet".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

impl VersionStore for GitStore {
    fn tracked(&self) -> StoreResult<BTreeSet<String>> {
        let listing = self.run(&["ls-files", "-z"])?;
        Ok(listing
            .split('\0')
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn stage(&mut self, files: &[String]) -> StoreResult<()> {
        self.run_with_paths(&["add"], files)
    }

    fn unstage_and_delete(&mut self, files: &[String]) -> StoreResult<()> {
        self.run_with_paths(&["rm", "-q", "--ignore-unmatch"], files)
    }

    fn commit(&mut self, message: &str) -> StoreResult<bool> {
        if !self.has_staged_changes()? {
            debug!("nothing staged, skipping commit");
            return Ok(false);
        }
        self.run(&["commit", "-q", "-m", message])?;
        Ok(true)
    }

    fn compact(&mut self) -> StoreResult<()> {
        self.run(&["gc", "--quiet"]).map(|_| ())
    }
}
