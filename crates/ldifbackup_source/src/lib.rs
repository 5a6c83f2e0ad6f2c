//! # ldif-git-backup line sources
//!
//! The lowest layer of ldif-git-backup: an ordered, strictly forward
//! sequence of text lines.
//!
//! Sources are **uninterpreted line streams** - they know nothing about
//! LDIF entries, folding or comments. The segmenter in `ldifbackup_core`
//! owns all format interpretation.
//!
//! ## Design Principles
//!
//! - One line per call, terminator included, `None` at end of stream
//! - Pull-based: a read blocks until the upstream producer has a line
//! - No seeking, no rewinding
//! - Upstream failures (bad UTF-8, non-zero child exit) surface as errors
//!
//! ## Available Sources
//!
//! - [`ReaderSource`] - Any `BufRead`
//! - [`FileSource`] - A file on disk
//! - [`CommandSource`] - Standard output of a child process
//! - [`StdinSource`] - Standard input of this process
//! - [`MemorySource`] - In-memory text, for tests and benches
//!
//! ## Example
//!
//! ```rust
//! use ldifbackup_source::{LineSource, MemorySource};
//!
//! let mut source = MemorySource::new("dn: cn=a\n\n");
//! assert_eq!(source.next_line().unwrap().as_deref(), Some("dn: cn=a\n"));
//! assert_eq!(source.next_line().unwrap().as_deref(), Some("\n"));
//! assert_eq!(source.next_line().unwrap(), None);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod error;
mod file;
mod memory;
mod reader;
mod source;
mod spec;

pub use command::{CommandSource, DEFAULT_COMMAND};
pub use error::{SourceError, SourceResult};
pub use file::FileSource;
pub use memory::MemorySource;
pub use reader::{ReaderSource, StdinSource};
pub use source::LineSource;
pub use spec::SourceSpec;
