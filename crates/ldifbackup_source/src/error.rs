//! Error types for line sources.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type for line source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while reading lines.
#[derive(Debug, Error)]
pub enum SourceError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file could not be opened.
    #[error("cannot open input {path}: {source}")]
    Open {
        /// The path that failed to open.
        path: String,
        /// The underlying error.
        source: io::Error,
    },

    /// The child process could not be started.
    #[error("cannot start `{command}`: {source}")]
    Spawn {
        /// The command line that failed to start.
        command: String,
        /// The underlying error.
        source: io::Error,
    },

    /// The child process exited unsuccessfully.
    #[error("`{command}` failed: {status}")]
    CommandFailed {
        /// The command line of the child.
        command: String,
        /// The exit status reported by the OS.
        status: ExitStatus,
    },

    /// A line was not valid UTF-8.
    #[error("input line {line} is not valid UTF-8")]
    InvalidUtf8 {
        /// 1-based physical line number.
        line: u64,
    },
}
