//! Error types for version store operations.

use std::io;
use thiserror::Error;

/// Result type for version store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to a version store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred, including failure to start `git`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The directory is not a repository.
    #[error("not a git repository: {path}")]
    NotARepository {
        /// The directory that was expected to hold a repository.
        path: String,
    },

    /// A store command exited unsuccessfully.
    #[error("`git {args}` failed: {stderr}")]
    CommandFailed {
        /// Arguments passed to the command.
        args: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}
