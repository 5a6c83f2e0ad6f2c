//! Line source reading a child process's standard output.

use crate::error::{SourceError, SourceResult};
use crate::reader::ReaderSource;
use crate::source::LineSource;
use std::io::BufReader;
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::debug;

/// Command used when no input is configured: dump database 1 of a local
/// OpenLDAP server.
pub const DEFAULT_COMMAND: &str = "/usr/sbin/slapcat -n 1";

/// A line source streaming the standard output of a child process.
///
/// The child is started by [`CommandSource::spawn`]. Its stdout pipe stays
/// open until the stream is exhausted; at that point the child is reaped
/// and a non-zero exit turns into [`SourceError::CommandFailed`]. The
/// child's stderr is inherited so its diagnostics reach the user directly.
///
/// There is no timeout: a stalled producer blocks `next_line` indefinitely.
pub struct CommandSource {
    command: String,
    child: Child,
    inner: Option<ReaderSource<BufReader<ChildStdout>>>,
    reaped: bool,
}

impl CommandSource {
    /// Starts `program` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Spawn`] if the process cannot be started.
    pub fn spawn<S: AsRef<str>>(program: &str, args: &[S]) -> SourceResult<Self> {
        let command = std::iter::once(program)
            .chain(args.iter().map(AsRef::as_ref))
            .collect::<Vec<_>>()
            .join(" ");

        let mut child = Command::new(program)
            .args(args.iter().map(AsRef::as_ref))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SourceError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| SourceError::Spawn {
            command: command.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;

        debug!(command = %command, pid = child.id(), "spawned input command");

        Ok(Self {
            inner: Some(ReaderSource::new(BufReader::new(stdout), command.clone())),
            command,
            child,
            reaped: false,
        })
    }

    /// Starts a whitespace-separated command line such as
    /// `"/usr/sbin/slapcat -n 1"`. No shell quoting is interpreted.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Spawn`] if the line is empty or the process
    /// cannot be started.
    pub fn from_command_line(line: &str) -> SourceResult<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next().ok_or_else(|| SourceError::Spawn {
            command: line.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;
        let args: Vec<&str> = parts.collect();
        Self::spawn(program, &args)
    }

    /// Returns the command line this source was started with.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    fn reap(&mut self) -> SourceResult<()> {
        // Closing our end first lets a producer blocked on a full pipe exit.
        self.inner = None;
        let status = self.child.wait()?;
        self.reaped = true;
        debug!(command = %self.command, %status, "input command exited");

        if status.success() {
            Ok(())
        } else {
            Err(SourceError::CommandFailed {
                command: self.command.clone(),
                status,
            })
        }
    }
}

impl LineSource for CommandSource {
    fn next_line(&mut self) -> SourceResult<Option<String>> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };

        match inner.next_line()? {
            Some(line) => Ok(Some(line)),
            None => {
                self.reap()?;
                Ok(None)
            }
        }
    }

    fn describe(&self) -> String {
        format!("command `{}`", self.command)
    }
}

impl Drop for CommandSource {
    fn drop(&mut self) {
        if !self.reaped {
            self.inner = None;
            let _ = self.child.wait();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn drain(source: &mut CommandSource) -> SourceResult<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = source.next_line()? {
            lines.push(line);
        }
        Ok(lines)
    }

    #[test]
    fn command_streams_stdout() {
        let mut source = CommandSource::spawn("printf", &["dn: cn=a\\nuid: U1\\n\\n"]).unwrap();
        let lines = drain(&mut source).unwrap();
        assert_eq!(lines, vec!["dn: cn=a\n", "uid: U1\n", "\n"]);
    }

    #[test]
    fn command_nonzero_exit_is_error() {
        let mut source = CommandSource::spawn("sh", &["-c", "echo partial; exit 3"]).unwrap();
        let result = drain(&mut source);
        assert!(matches!(result, Err(SourceError::CommandFailed { .. })));
    }

    #[test]
    fn command_missing_program() {
        let result = CommandSource::spawn::<&str>("/nonexistent/slapcat-binary", &[]);
        assert!(matches!(result, Err(SourceError::Spawn { .. })));
    }

    #[test]
    fn command_line_is_split_on_whitespace() {
        let mut source = CommandSource::from_command_line("echo  one   two").unwrap();
        assert_eq!(source.command(), "echo one two");
        assert_eq!(drain(&mut source).unwrap(), vec!["one two\n"]);
    }

    #[test]
    fn command_line_empty_is_rejected() {
        assert!(CommandSource::from_command_line("   ").is_err());
    }

    #[test]
    fn command_exhausted_stays_exhausted() {
        let mut source = CommandSource::spawn("echo", &["x"]).unwrap();
        drain(&mut source).unwrap();
        assert_eq!(source.next_line().unwrap(), None);
    }
}
