//! File-based line source.

use crate::error::{SourceError, SourceResult};
use crate::reader::ReaderSource;
use crate::source::LineSource;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A line source reading an LDIF file from disk.
///
/// The file is opened eagerly so that a missing or unreadable path is
/// reported before any line is processed.
///
/// # Example
///
/// ```no_run
/// use ldifbackup_source::{FileSource, LineSource};
/// use std::path::Path;
///
/// let mut source = FileSource::open(Path::new("export.ldif")).unwrap();
/// while let Some(line) = source.next_line().unwrap() {
///     print!("{line}");
/// }
/// ```
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    inner: ReaderSource<BufReader<File>>,
}

impl FileSource {
    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Open`] if the file cannot be opened.
    pub fn open(path: &Path) -> SourceResult<Self> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let label = path.display().to_string();
        debug!(path = %label, "opened input file");

        Ok(Self {
            path: path.to_path_buf(),
            inner: ReaderSource::new(BufReader::new(file), label),
        })
    }

    /// Returns the path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileSource {
    fn next_line(&mut self) -> SourceResult<Option<String>> {
        self.inner.next_line()
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}
