//! Config file loading and merging.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. the TOML config file (`--config`, or `$LDIF_GIT_BACKUP_CONFIG`)
//! 3. command-line flags
//!
//! ```toml
//! output = "/var/backups/ldap"
//! command = "/usr/sbin/slapcat -n 1"
//! format = "wrapped"
//! key-attribute = "entryUUID"
//! exclude = ["userPassword", "pwdHistory"]
//! on-missing-key = "abort"
//! gc = true
//! ```

use crate::{RunArgs, StoreArgs};
use ldifbackup_core::{
    Dialect, MissingKeyPolicy, OutputMode, RunConfig, SegmenterConfig, StoreActions,
    WriterConfig, DEFAULT_COMMIT_MESSAGE, DEFAULT_EXTENSION,
};
use ldifbackup_source::SourceSpec;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LDIF_GIT_BACKUP_CONFIG";

/// Errors raised while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying error.
        source: toml::de::Error,
    },

    /// No output directory was given anywhere.
    #[error("no output directory: pass --output or set `output` in the config file")]
    MissingOutput,

    /// A command line with no program in it.
    #[error("empty input command {0:?}")]
    EmptyCommand(String),
}

/// Contents of the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub output: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub command: Option<String>,
    pub format: Option<Dialect>,
    pub key_attribute: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub aggregate: Option<String>,
    pub extension: Option<String>,
    pub on_missing_key: Option<MissingKeyPolicy>,
    pub message: Option<String>,
    pub add: Option<bool>,
    pub remove: Option<bool>,
    pub commit: Option<bool>,
    pub gc: Option<bool>,
}

impl FileConfig {
    /// Loads the config file from `explicit`, else from the path in
    /// [`CONFIG_ENV`]. With neither, every setting is left unset.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(value) if !value.is_empty() => PathBuf::from(value),
                _ => return Ok(Self::default()),
            },
        };
        Self::load_from(&path)
    }

    /// Loads a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Everything a command needs to run.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Core configuration.
    pub config: RunConfig,
    /// Where the dump comes from.
    pub source: SourceSpec,
}

/// Merges defaults, the config file and the flags.
///
/// `store` is `None` for commands that never touch the version store.
pub fn resolve(
    file: &FileConfig,
    output: Option<&Path>,
    run: &RunArgs,
    store: Option<&StoreArgs>,
) -> Result<Resolved, ConfigError> {
    let output = output
        .map(Path::to_path_buf)
        .or_else(|| file.output.clone())
        .ok_or(ConfigError::MissingOutput)?;

    let mut segmenter = SegmenterConfig::new();
    if let Some(dialect) = run.format.or(file.format) {
        segmenter = segmenter.dialect(dialect);
    }
    if let Some(key) = run.key_attribute.as_ref().or(file.key_attribute.as_ref()) {
        segmenter = segmenter.key_attribute(key.clone());
    }
    segmenter.exclude = if run.exclude.is_empty() {
        file.exclude.clone().unwrap_or_default()
    } else {
        run.exclude.clone()
    };

    let mode = match run.aggregate.as_ref().or(file.aggregate.as_ref()) {
        Some(name) => OutputMode::aggregate(name.clone()),
        None => OutputMode::PerEntry {
            extension: run
                .extension
                .clone()
                .or_else(|| file.extension.clone())
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        },
    };
    let writer = WriterConfig::new(&output)
        .mode(mode)
        .missing_key(run.on_missing_key.or(file.on_missing_key).unwrap_or_default())
        .suppress(run.dry_run);

    let actions = match store {
        Some(flags) => StoreActions {
            stage: file.add.unwrap_or(true) && !flags.no_add,
            remove: file.remove.unwrap_or(true) && !flags.no_remove,
            commit: file.commit.unwrap_or(true) && !flags.no_commit,
            compact: flags.gc || file.gc.unwrap_or(false),
            message: flags
                .message
                .clone()
                .or_else(|| file.message.clone())
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
        },
        None => StoreActions::none(),
    };

    let config = RunConfig::new(&output)
        .with_segmenter(segmenter)
        .with_writer(writer)
        .with_store(actions);

    Ok(Resolved {
        config,
        source: source_spec(file, run)?,
    })
}

fn source_spec(file: &FileConfig, run: &RunArgs) -> Result<SourceSpec, ConfigError> {
    if run.stdin {
        return Ok(SourceSpec::Stdin);
    }
    if let Some(path) = &run.input {
        return Ok(SourceSpec::File(path.clone()));
    }
    if let Some(line) = &run.command {
        return SourceSpec::command_line(line).ok_or_else(|| ConfigError::EmptyCommand(line.clone()));
    }
    if let Some(path) = &file.input {
        return Ok(SourceSpec::File(path.clone()));
    }
    if let Some(line) = &file.command {
        return SourceSpec::command_line(line).ok_or_else(|| ConfigError::EmptyCommand(line.clone()));
    }
    Ok(SourceSpec::default())
}
