//! # ldif-git-backup version stores
//!
//! Persistence of the produced file set as versioned snapshots.
//!
//! A version store sees only **file names relative to the output
//! directory**. It never reads the files' contents or interprets LDIF; the
//! reconciler in `ldifbackup_core` decides what to stage and what to drop.
//!
//! ## Available Stores
//!
//! - [`GitStore`] - A git repository rooted at the output directory
//! - [`MemoryStore`] - Records calls in memory, for testing
//!
//! ## Example
//!
//! ```rust
//! use ldifbackup_store::{MemoryStore, VersionStore};
//!
//! let mut store = MemoryStore::with_tracked(["a.ldif", "b.ldif"]);
//! store.unstage_and_delete(&["a.ldif".to_string()]).unwrap();
//! store.stage(&["c.ldif".to_string()]).unwrap();
//! assert!(store.commit("snapshot").unwrap());
//! assert_eq!(store.tracked().unwrap().len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod git;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use git::GitStore;
pub use memory::{MemoryStore, StoreCall};
pub use store::VersionStore;
