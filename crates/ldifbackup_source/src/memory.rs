//! In-memory line source for testing.

use crate::error::SourceResult;
use crate::source::LineSource;
use std::collections::VecDeque;

/// A line source over text held in memory.
///
/// Suitable for unit tests, integration tests and benchmarks. The text is
/// split after every `\n`, so lines keep their terminators exactly as a
/// file or pipe source would return them.
///
/// # Example
///
/// ```rust
/// use ldifbackup_source::{LineSource, MemorySource};
///
/// let mut source = MemorySource::new("a: 1\nb: 2");
/// assert_eq!(source.remaining(), 2);
/// assert_eq!(source.next_line().unwrap().as_deref(), Some("a: 1\n"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    lines: VecDeque<String>,
}

impl MemorySource {
    /// Creates a source yielding the lines of `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// Creates a source from already-split physical lines.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of lines not yet returned.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for MemorySource {
    fn next_line(&mut self) -> SourceResult<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_empty() {
        let mut source = MemorySource::new("");
        assert_eq!(source.remaining(), 0);
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn memory_splits_inclusive() {
        let mut source = MemorySource::new("a\n\nb\n");
        assert_eq!(source.next_line().unwrap().as_deref(), Some("a\n"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("\n"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("b\n"));
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn memory_from_lines() {
        let mut source = MemorySource::from_lines(["x\n", " y\n"]);
        assert_eq!(source.remaining(), 2);
        source.next_line().unwrap();
        assert_eq!(source.next_line().unwrap().as_deref(), Some(" y\n"));
    }
}
