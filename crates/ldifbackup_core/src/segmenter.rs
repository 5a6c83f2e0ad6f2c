//! Streaming entry segmenter.
//!
//! Turns a [`LineSource`] into a sequence of [`Entry`] values, one at a
//! time. Only the entry under construction and one pending attribute are
//! held in memory; the segmenter never buffers the whole document.
//!
//! # Dialects
//!
//! | dialect     | folding | comments | `version:` header | blank-line runs        |
//! |-------------|---------|----------|-------------------|------------------------|
//! | `Unwrapped` | no      | no       | no                | each blank line ends an entry |
//! | `Wrapped`   | yes     | no       | no                | each blank line ends an entry |
//! | `Versioned` | yes     | yes      | required          | collapse to one boundary |
//!
//! In the first two dialects a blank line always produces an entry, so the
//! number of entries equals the number of boundaries, even when that makes
//! an entry empty. The versioned dialect never emits empty entries.
//!
//! # Per-entry state
//!
//! The pending attribute, the attributes collected so far, the key-found
//! flag and the key are reset together at every boundary. The key is taken
//! from the first matching logical attribute, before the exclusion filter
//! runs, so an excluded attribute can still name the file.

use crate::config::{Dialect, OutputMode, SegmenterConfig};
use crate::entry::{Attribute, Entry, EntryKey};
use crate::error::{CoreError, CoreResult};
use crate::extractor::FilenameExtractor;
use crate::filter::AttributeFilter;
use ldifbackup_source::LineSource;
use serde::Serialize;
use tracing::{debug, warn};

/// Counters collected while segmenting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmenterStats {
    /// Physical lines read from the source.
    pub lines_read: u64,
    /// Entries emitted.
    pub entries: u64,
    /// Boundaries consumed (blank lines, or collapsed blank runs).
    pub boundaries: u64,
    /// Attributes left out by the exclusion filter.
    pub attributes_filtered: u64,
    /// Comment lines dropped, continuation lines included.
    pub comment_lines: u64,
    /// Continuation lines with no attribute to continue.
    pub orphan_continuations: u64,
}

/// Per-entry transient state.
#[derive(Debug, Default)]
struct EntryState {
    pending: Option<String>,
    attributes: Vec<Attribute>,
    seen: usize,
    key_found: bool,
    key: Option<EntryKey>,
}

impl EntryState {
    fn has_content(&self) -> bool {
        self.seen > 0 || self.pending.is_some()
    }

    fn take(&mut self) -> Entry {
        let state = std::mem::take(self);
        Entry::from_parts(state.attributes, state.key)
    }
}

/// Classification of one physical line, terminator removed.
enum LineKind<'a> {
    Blank,
    Continuation(&'a str),
    Comment(&'a str),
    Content(&'a str),
}

/// Removes a trailing `\n` or `\r\n`.
fn strip_terminator(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}

/// Splits a line into its kind for the folding dialects.
///
/// A continuation keeps everything after exactly one leading space.
fn classify(text: &str, comments: bool) -> LineKind<'_> {
    if text.is_empty() {
        LineKind::Blank
    } else if let Some(rest) = text.strip_prefix(' ') {
        LineKind::Continuation(rest)
    } else if comments && text.starts_with('#') {
        LineKind::Comment(text)
    } else {
        LineKind::Content(text)
    }
}

/// Segments a line stream into entries.
///
/// Construct with [`Segmenter::new`], then call [`Segmenter::next_entry`]
/// until it returns `None`, or iterate.
///
/// # Example
///
/// ```rust
/// use ldifbackup_core::{Dialect, OutputMode, SegmenterConfig, Segmenter};
/// use ldifbackup_source::MemorySource;
///
/// let config = SegmenterConfig::new().dialect(Dialect::Wrapped).key_attribute("uid");
/// let source = MemorySource::new("dn: cn=a\nuid: U1\ndescription: foo\n bar\n\n");
/// let mut segmenter = Segmenter::new(source, &config, &OutputMode::per_entry()).unwrap();
///
/// let entry = segmenter.next_entry().unwrap().unwrap();
/// assert_eq!(entry.key().unwrap().as_str(), "U1");
/// assert_eq!(entry.attributes()[2].as_str(), "description: foobar");
/// assert!(segmenter.next_entry().unwrap().is_none());
/// ```
pub struct Segmenter<S> {
    source: S,
    dialect: Dialect,
    filter: AttributeFilter,
    extractor: Option<FilenameExtractor>,
    lookahead: Option<String>,
    version: Option<String>,
    header_done: bool,
    finished: bool,
    state: EntryState,
    stats: SegmenterStats,
}

impl<S: LineSource> Segmenter<S> {
    /// Creates a segmenter reading `source`.
    ///
    /// Key extraction is enabled only for per-entry output.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the exclusion pattern does not
    /// compile or the key attribute is malformed. Nothing is read from the
    /// source before these checks.
    pub fn new(source: S, config: &SegmenterConfig, mode: &OutputMode) -> CoreResult<Self> {
        let filter = AttributeFilter::new(&config.exclude)?;
        Self::with_filter(source, config, mode, filter)
    }

    /// Creates a segmenter with an already compiled exclusion filter.
    /// `config.exclude` is ignored.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key attribute is malformed.
    pub fn with_filter(
        source: S,
        config: &SegmenterConfig,
        mode: &OutputMode,
        filter: AttributeFilter,
    ) -> CoreResult<Self> {
        let extractor = if mode.needs_keys() {
            Some(FilenameExtractor::new(&config.key_attribute)?)
        } else {
            None
        };

        Ok(Self {
            source,
            dialect: config.dialect,
            filter,
            extractor,
            lookahead: None,
            version: None,
            header_done: config.dialect != Dialect::Versioned,
            finished: false,
            state: EntryState::default(),
            stats: SegmenterStats::default(),
        })
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &SegmenterStats {
        &self.stats
    }

    /// The value of the `version:` header, once read (versioned dialect).
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the next complete entry, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails, or if a versioned stream lacks
    /// its `version:` line. After an error no further entries are produced.
    pub fn next_entry(&mut self) -> CoreResult<Option<Entry>> {
        if self.finished {
            return Ok(None);
        }

        let result = match self.dialect {
            Dialect::Unwrapped => self.next_unwrapped(),
            Dialect::Wrapped => self.next_wrapped(),
            Dialect::Versioned => self.next_versioned(),
        };

        match result {
            Ok(Some(entry)) => {
                self.stats.entries += 1;
                Ok(Some(entry))
            }
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    fn read_physical(&mut self) -> CoreResult<Option<String>> {
        if let Some(line) = self.lookahead.take() {
            return Ok(Some(line));
        }
        let line = self.source.next_line()?;
        if line.is_some() {
            self.stats.lines_read += 1;
        }
        Ok(line)
    }

    /// Fills the one-line lookahead and reports whether it continues the
    /// current logical line.
    fn peek_is_continuation(&mut self) -> CoreResult<bool> {
        if self.lookahead.is_none() {
            self.lookahead = self.source.next_line()?;
            if self.lookahead.is_some() {
                self.stats.lines_read += 1;
            }
        }
        Ok(self.lookahead.as_deref().is_some_and(|l| l.starts_with(' ')))
    }

    /// Completes the logical line started by `first` by pulling every
    /// following continuation line out of the lookahead.
    fn fold_from(&mut self, first: &str) -> CoreResult<String> {
        let mut logical = first.to_string();
        while self.peek_is_continuation()? {
            if let Some(next) = self.lookahead.take() {
                logical.push_str(&strip_terminator(&next)[1..]);
            }
        }
        Ok(logical)
    }

    /// Drops the continuation lines belonging to a comment.
    fn skip_comment(&mut self) -> CoreResult<()> {
        self.stats.comment_lines += 1;
        while self.peek_is_continuation()? {
            self.lookahead = None;
            self.stats.comment_lines += 1;
        }
        Ok(())
    }

    /// Runs key extraction, then the filter, on one logical attribute.
    fn accept(&mut self, text: String) {
        let attribute = Attribute::new(text);
        self.state.seen += 1;

        if !self.state.key_found {
            if let Some(key) = self.extractor.as_ref().and_then(|ex| ex.extract(&attribute)) {
                self.state.key = Some(key);
                self.state.key_found = true;
            }
        }

        if self.filter.excludes(&attribute) {
            self.stats.attributes_filtered += 1;
            debug!(attribute = attribute.name(), "excluded attribute");
            return;
        }
        self.state.attributes.push(attribute);
    }

    fn flush_pending(&mut self) {
        if let Some(text) = self.state.pending.take() {
            self.accept(text);
        }
    }

    fn boundary(&mut self) -> Entry {
        self.stats.boundaries += 1;
        self.state.take()
    }

    fn end_of_input(&mut self) -> Option<Entry> {
        self.flush_pending();
        if self.state.has_content() {
            Some(self.state.take())
        } else {
            None
        }
    }

    fn orphan(&mut self, text: &str) {
        self.stats.orphan_continuations += 1;
        warn!(
            line = self.stats.lines_read,
            text, "continuation line with no attribute to continue, dropped"
        );
    }

    fn next_unwrapped(&mut self) -> CoreResult<Option<Entry>> {
        loop {
            let Some(line) = self.read_physical()? else {
                return Ok(self.end_of_input());
            };
            let text = strip_terminator(&line);
            if text.is_empty() {
                return Ok(Some(self.boundary()));
            }
            self.accept(text.to_string());
        }
    }

    fn next_wrapped(&mut self) -> CoreResult<Option<Entry>> {
        loop {
            let Some(line) = self.read_physical()? else {
                return Ok(self.end_of_input());
            };
            match classify(strip_terminator(&line), false) {
                LineKind::Blank => {
                    self.flush_pending();
                    return Ok(Some(self.boundary()));
                }
                LineKind::Continuation(rest) => match self.state.pending.as_mut() {
                    Some(pending) => pending.push_str(rest),
                    None => self.orphan(rest),
                },
                LineKind::Content(text) | LineKind::Comment(text) => {
                    self.flush_pending();
                    self.state.pending = Some(text.to_string());
                }
            }
        }
    }

    fn next_versioned(&mut self) -> CoreResult<Option<Entry>> {
        if !self.header_done {
            self.read_header()?;
        }

        loop {
            let Some(line) = self.read_physical()? else {
                return Ok(self.end_of_input());
            };
            match classify(strip_terminator(&line), true) {
                LineKind::Blank => {
                    if self.state.has_content() {
                        return Ok(Some(self.boundary()));
                    }
                }
                LineKind::Comment(_) => self.skip_comment()?,
                LineKind::Continuation(rest) => self.orphan(rest),
                LineKind::Content(text) => {
                    let logical = self.fold_from(text)?;
                    self.accept(logical);
                }
            }
        }
    }

    /// Consumes the `version:` header, skipping leading blank lines and
    /// comments. An empty stream has no header and no entries.
    fn read_header(&mut self) -> CoreResult<()> {
        self.header_done = true;
        loop {
            let Some(line) = self.read_physical()? else {
                return Ok(());
            };
            match classify(strip_terminator(&line), true) {
                LineKind::Blank => {}
                LineKind::Comment(_) => self.skip_comment()?,
                LineKind::Continuation(rest) => self.orphan(rest),
                LineKind::Content(text) => {
                    let logical = self.fold_from(text)?;
                    let header = Attribute::new(logical);
                    if !header.name().eq_ignore_ascii_case("version") {
                        return Err(CoreError::MissingVersion {
                            line: header.into_string(),
                        });
                    }

                    let declared = header.value().unwrap_or_default().trim().to_string();
                    if declared != "1" {
                        warn!(version = %declared, "unsupported LDIF version, continuing as version 1");
                    } else {
                        debug!("LDIF version 1");
                    }
                    self.version = Some(declared);
                    return Ok(());
                }
            }
        }
    }
}

impl<S: LineSource> Iterator for Segmenter<S> {
    type Item = CoreResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
