//! # ldif-git-backup testkit
//!
//! Test utilities for ldif-git-backup.
//!
//! This crate provides:
//! - Sample LDIF documents for every input dialect
//! - Temporary output directories with inspection helpers
//! - Property-based generators for entries and documents, with renderers
//!   for each dialect
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ldifbackup_testkit::prelude::*;
//!
//! #[test]
//! fn splits_sample() {
//!     let out = TestOutput::new();
//!     let summary = split(&out.config(Dialect::Versioned), VERSIONED_SAMPLE).unwrap();
//!     assert_eq!(summary.files, out.file_names().len());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use ldifbackup_core::{Dialect, RunConfig, SegmenterConfig, WriterConfig};
}

pub use fixtures::*;
pub use generators::*;
