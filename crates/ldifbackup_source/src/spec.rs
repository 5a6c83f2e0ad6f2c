//! Input selection.

use crate::command::CommandSource;
use crate::error::SourceResult;
use crate::file::FileSource;
use crate::reader::StdinSource;
use crate::source::LineSource;
use std::fmt;
use std::path::PathBuf;

/// Where the LDIF stream comes from.
///
/// Chosen once per run; every variant yields the same kind of line stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Read an LDIF file.
    File(PathBuf),
    /// Run a program and read its standard output.
    Command {
        /// Program to execute.
        program: String,
        /// Arguments passed to the program.
        args: Vec<String>,
    },
    /// Read standard input.
    Stdin,
}

impl SourceSpec {
    /// Builds a [`SourceSpec::Command`] from a whitespace-separated line.
    ///
    /// Returns `None` if the line contains no program.
    #[must_use]
    pub fn command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::Command {
            program,
            args: parts.collect(),
        })
    }

    /// Opens the selected source.
    ///
    /// Files are opened and commands are started immediately, so failures
    /// surface before the first line is requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the command cannot
    /// be started.
    pub fn open(&self) -> SourceResult<Box<dyn LineSource>> {
        Ok(match self {
            SourceSpec::File(path) => Box::new(FileSource::open(path)?),
            SourceSpec::Command { program, args } => Box::new(CommandSource::spawn(program, args)?),
            SourceSpec::Stdin => Box::new(StdinSource::new()),
        })
    }
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self::command_line(crate::command::DEFAULT_COMMAND).unwrap_or(Self::Stdin)
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::File(path) => write!(f, "file {}", path.display()),
            SourceSpec::Command { program, args } => {
                write!(f, "command `{program}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, "`")
            }
            SourceSpec::Stdin => write!(f, "standard input"),
        }
    }
}
