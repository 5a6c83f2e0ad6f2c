//! Line source trait definition.

use crate::error::SourceResult;

/// An ordered, forward-only stream of text lines.
///
/// Line sources are **uninterpreted**. They hand out physical lines exactly
/// as the producer wrote them; LDIF structure is decided one layer up.
///
/// # Invariants
///
/// - Every returned line keeps its terminator (`"\n"` or `"\r\n"`); only the
///   final line of a stream may lack one
/// - `Ok(None)` means end of stream and is returned for every call after it
/// - Lines are returned in producer order, each exactly once
///
/// # Implementors
///
/// - [`super::ReaderSource`] / [`super::StdinSource`]
/// - [`super::FileSource`]
/// - [`super::CommandSource`]
/// - [`super::MemorySource`] - For testing
pub trait LineSource {
    /// Returns the next line, or `None` once the stream is exhausted.
    ///
    /// Blocks until the producer supplies a line or closes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying read fails
    /// - The line is not valid UTF-8
    /// - A child process producing the stream exits unsuccessfully
    fn next_line(&mut self) -> SourceResult<Option<String>>;

    /// A short human-readable description of where lines come from.
    fn describe(&self) -> String;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> SourceResult<Option<String>> {
        (**self).next_line()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
