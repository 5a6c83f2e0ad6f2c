//! # ldif-git-backup core
//!
//! Turns a continuous LDIF stream into one file per directory entry (or
//! one aggregate file) and reconciles the result with the previous
//! snapshot in a version store.
//!
//! This crate provides:
//! - A streaming entry segmenter for three input dialects
//! - Attribute exclusion and key-attribute extraction
//! - Per-entry and aggregate writers
//! - Snapshot reconciliation against a [`ldifbackup_store::VersionStore`]
//! - [`Pipeline`], which runs all of the above with one [`RunConfig`]
//!
//! ## Example
//!
//! ```rust
//! use ldifbackup_core::{Dialect, Pipeline, RunConfig, SegmenterConfig};
//! use ldifbackup_source::MemorySource;
//! use ldifbackup_store::MemoryStore;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = RunConfig::new(dir.path())
//!     .with_segmenter(SegmenterConfig::new().dialect(Dialect::Unwrapped).key_attribute("uid"));
//!
//! let mut store = MemoryStore::new();
//! let summary = Pipeline::new(&config)
//!     .unwrap()
//!     .run(MemorySource::new("dn: cn=a\nuid: U1\n\n"), &mut store)
//!     .unwrap();
//!
//! assert_eq!(summary.files, 1);
//! assert!(dir.path().join("U1.ldif").exists());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entry;
mod error;
mod extractor;
mod filter;
mod pipeline;
mod reconcile;
mod segmenter;
mod writer;

pub use config::{
    validate_attribute_name, Dialect, MissingKeyPolicy, OutputMode, RunConfig, SegmenterConfig,
    StoreActions, WriterConfig, DEFAULT_COMMIT_MESSAGE, DEFAULT_EXTENSION, DEFAULT_KEY_ATTRIBUTE,
};
pub use entry::{Attribute, Entry, EntryKey};
pub use error::{CoreError, CoreResult};
pub use extractor::FilenameExtractor;
pub use filter::AttributeFilter;
pub use pipeline::{open_source, Pipeline, RunSummary};
pub use reconcile::{ReconcilerInputs, Reconciliation, SnapshotScope, StoreOutcome};
pub use segmenter::{Segmenter, SegmenterStats};
pub use writer::{EntryWriter, FileSet, WriteOutcome, WriterOutput, WriterStats};
