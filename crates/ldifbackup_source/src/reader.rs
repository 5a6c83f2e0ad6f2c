//! Line source over any buffered reader.

use crate::error::{SourceError, SourceResult};
use crate::source::LineSource;
use std::io::{self, BufRead, StdinLock};

/// A line source reading from any [`BufRead`].
///
/// This is the shared engine behind the file, command and stdin sources.
/// Bytes are read up to and including each `\n` and then validated as UTF-8.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    label: String,
    line_no: u64,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> ReaderSource<R> {
    /// Wraps a buffered reader; `label` is used in log and error messages.
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            reader,
            label: label.into(),
            line_no: 0,
            buf: Vec::with_capacity(256),
            done: false,
        }
    }

    /// Number of physical lines returned so far.
    #[must_use]
    pub fn lines_read(&self) -> u64 {
        self.line_no
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> SourceResult<Option<String>> {
        if self.done {
            return Ok(None);
        }

        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            self.done = true;
            return Ok(None);
        }
        self.line_no += 1;

        match String::from_utf8(std::mem::take(&mut self.buf)) {
            Ok(line) => Ok(Some(line)),
            Err(_) => Err(SourceError::InvalidUtf8 { line: self.line_no }),
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// A line source reading this process's standard input.
pub struct StdinSource {
    inner: ReaderSource<StdinLock<'static>>,
}

impl StdinSource {
    /// Locks standard input for the lifetime of the source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ReaderSource::new(io::stdin().lock(), "standard input"),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for StdinSource {
    fn next_line(&mut self) -> SourceResult<Option<String>> {
        self.inner.next_line()
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}
