//! Error types for ldif-git-backup core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while segmenting, writing or reconciling.
///
/// Every variant is fatal for the run. Conditions that only skip work
/// (a missing key under [`crate::MissingKeyPolicy::Skip`], a filtered
/// attribute) are not errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Upstream line source error: the input stream failed mid-read or the
    /// producing command exited unsuccessfully.
    #[error("input error: {0}")]
    Source(#[from] ldifbackup_source::SourceError),

    /// Version store error, passed through unmodified.
    #[error("version store error: {0}")]
    Store(#[from] ldifbackup_store::StoreError),

    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration, detected before any entry is processed.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// An entry lacks the key attribute in per-entry output mode.
    #[error("entry {entry} has no {key_attribute} attribute")]
    MissingKey {
        /// The configured key attribute.
        key_attribute: String,
        /// Identifies the offending entry (its DN or first line).
        entry: String,
    },

    /// An extracted key cannot be used as a file name.
    #[error("key {key:?} cannot be used as a file name")]
    InvalidKey {
        /// The rejected key value.
        key: String,
    },

    /// A versioned stream did not start with a `version:` line.
    #[error("versioned LDIF must start with a version line, found {line:?}")]
    MissingVersion {
        /// The first content line found instead.
        line: String,
    },
}

impl CoreError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true for errors raised before any input was consumed.
    pub fn is_configuration(&self) -> bool {
        matches!(self, CoreError::Config { .. })
    }
}
