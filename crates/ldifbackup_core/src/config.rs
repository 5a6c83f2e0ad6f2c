//! Run configuration.
//!
//! One immutable [`RunConfig`] is built at startup and handed by reference
//! to each component. Each component owns its own section:
//!
//! - [`SegmenterConfig`] - dialect, key attribute, exclusions
//! - [`WriterConfig`] - output directory, output mode, missing-key policy
//! - [`StoreActions`] - which version store calls are enabled

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Default key attribute: the server-assigned unique identifier of an entry.
pub const DEFAULT_KEY_ATTRIBUTE: &str = "entryUUID";

/// Default extension of per-entry files.
pub const DEFAULT_EXTENSION: &str = "ldif";

/// Default commit message.
pub const DEFAULT_COMMIT_MESSAGE: &str = "ldif-git-backup snapshot";

/// The wire dialect of the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// One attribute per physical line; a blank line ends an entry.
    Unwrapped,
    /// Long values folded onto continuation lines starting with one space.
    Wrapped,
    /// Wrapped, plus a leading `version:` line, `#` comments and tolerance
    /// for runs of blank lines.
    Versioned,
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unwrapped" => Ok(Dialect::Unwrapped),
            "wrapped" => Ok(Dialect::Wrapped),
            "versioned" => Ok(Dialect::Versioned),
            other => Err(format!(
                "unknown format {other:?} (expected unwrapped, wrapped or versioned)"
            )),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Unwrapped => "unwrapped",
            Dialect::Wrapped => "wrapped",
            Dialect::Versioned => "versioned",
        })
    }
}

/// What to do with an entry that has no key attribute in per-entry mode.
///
/// The same policy applies to every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Fail the run with [`CoreError::MissingKey`]; nothing is committed.
    #[default]
    Abort,
    /// Drop the entry, count it, and continue.
    Skip,
}

impl FromStr for MissingKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(MissingKeyPolicy::Abort),
            "skip" => Ok(MissingKeyPolicy::Skip),
            other => Err(format!("unknown policy {other:?} (expected abort or skip)")),
        }
    }
}

/// How completed entries are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// One file per entry, named `<key>.<extension>`.
    PerEntry {
        /// File extension without the leading dot.
        extension: String,
    },
    /// All entries appended to a single file.
    Aggregate {
        /// Name of the file inside the output directory.
        file_name: String,
    },
}

impl OutputMode {
    /// Per-entry mode with the default extension.
    #[must_use]
    pub fn per_entry() -> Self {
        OutputMode::PerEntry {
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Aggregate mode writing to `file_name`.
    #[must_use]
    pub fn aggregate(file_name: impl Into<String>) -> Self {
        OutputMode::Aggregate {
            file_name: file_name.into(),
        }
    }

    /// Returns true in per-entry mode, the only mode that needs keys.
    #[must_use]
    pub fn needs_keys(&self) -> bool {
        matches!(self, OutputMode::PerEntry { .. })
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::per_entry()
    }
}

/// Configuration owned by the entry segmenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Input dialect.
    pub dialect: Dialect,
    /// Attribute whose value names per-entry files.
    pub key_attribute: String,
    /// Attribute-name alternatives excluded from output.
    ///
    /// Each element is a regular-expression fragment matched against the
    /// attribute name, e.g. `userPassword` or `pwd.*`.
    pub exclude: Vec<String>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Wrapped,
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            exclude: Vec::new(),
        }
    }
}

impl SegmenterConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input dialect.
    #[must_use]
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets the key attribute.
    #[must_use]
    pub fn key_attribute(mut self, name: impl Into<String>) -> Self {
        self.key_attribute = name.into();
        self
    }

    /// Adds an excluded attribute name.
    #[must_use]
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }
}

/// Configuration owned by the entry writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Directory receiving output files.
    pub output_dir: PathBuf,
    /// Per-entry or aggregate output.
    pub mode: OutputMode,
    /// Handling of entries without a key in per-entry mode.
    pub missing_key: MissingKeyPolicy,
    /// Dry run: compute everything, write nothing.
    pub suppress: bool,
}

impl WriterConfig {
    /// Creates a per-entry configuration writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            mode: OutputMode::default(),
            missing_key: MissingKeyPolicy::default(),
            suppress: false,
        }
    }

    /// Sets the output mode.
    #[must_use]
    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the missing-key policy.
    #[must_use]
    pub const fn missing_key(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_key = policy;
        self
    }

    /// Enables or disables output suppression.
    #[must_use]
    pub const fn suppress(mut self, value: bool) -> Self {
        self.suppress = value;
        self
    }
}

/// Which version store calls a run makes.
///
/// Each flag is independent; the core never second-guesses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreActions {
    /// Stage every file written this run.
    pub stage: bool,
    /// Remove files that were not regenerated.
    pub remove: bool,
    /// Commit the staged changes.
    pub commit: bool,
    /// Compact the store after committing.
    pub compact: bool,
    /// Commit message.
    pub message: String,
}

impl Default for StoreActions {
    fn default() -> Self {
        Self {
            stage: true,
            remove: true,
            commit: true,
            compact: false,
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

impl StoreActions {
    /// Actions that never touch the store.
    #[must_use]
    pub fn none() -> Self {
        Self {
            stage: false,
            remove: false,
            commit: false,
            compact: false,
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

/// Complete configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Segmenter section.
    pub segmenter: SegmenterConfig,
    /// Writer section.
    pub writer: WriterConfig,
    /// Version store section.
    pub store: StoreActions,
}

impl RunConfig {
    /// Creates a configuration with default sections writing to `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            writer: WriterConfig::new(output_dir),
            store: StoreActions::default(),
        }
    }

    /// Replaces the segmenter section.
    #[must_use]
    pub fn with_segmenter(mut self, segmenter: SegmenterConfig) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Replaces the writer section.
    #[must_use]
    pub fn with_writer(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }

    /// Replaces the store section.
    #[must_use]
    pub fn with_store(mut self, store: StoreActions) -> Self {
        self.store = store;
        self
    }

    /// Checks everything that can be checked without touching the input.
    ///
    /// The exclusion pattern itself is compiled by
    /// [`crate::AttributeFilter::new`], which reports its own errors.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] for a malformed key attribute, an empty
    /// or path-like extension or aggregate name, or an output path that
    /// exists but is not a directory.
    pub fn validate(&self) -> CoreResult<()> {
        validate_attribute_name(&self.segmenter.key_attribute)?;

        match &self.writer.mode {
            OutputMode::PerEntry { extension } => validate_file_component("extension", extension)?,
            OutputMode::Aggregate { file_name } => {
                validate_file_component("aggregate file name", file_name)?
            }
        }

        let dir = &self.writer.output_dir;
        if dir.as_os_str().is_empty() {
            return Err(CoreError::config("output directory is empty"));
        }
        if dir.exists() && !dir.is_dir() {
            return Err(CoreError::config(format!(
                "output path is not a directory: {}",
                dir.display()
            )));
        }
        Ok(())
    }

    /// Returns the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.writer.output_dir
    }
}

/// Checks that `name` is an LDAP attribute description: a descriptor or a
/// numeric OID, optionally followed by `;option`s.
///
/// # Errors
///
/// Returns [`CoreError::Config`] if the name is malformed.
pub fn validate_attribute_name(name: &str) -> CoreResult<()> {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    let re = ATTRIBUTE.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z][A-Za-z0-9-]*|[0-9]+(?:\.[0-9]+)*)(?:;[A-Za-z0-9-]+)*$")
            .expect("attribute name pattern is valid")
    });

    if re.is_match(name) {
        Ok(())
    } else {
        Err(CoreError::config(format!("malformed key attribute name {name:?}")))
    }
}

fn validate_file_component(what: &str, value: &str) -> CoreResult<()> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\', '\0']) {
        return Err(CoreError::config(format!("invalid {what} {value:?}")));
    }
    Ok(())
}
