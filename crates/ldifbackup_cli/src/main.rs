//! ldif-git-backup CLI
//!
//! Splits an LDIF dump into one file per entry and snapshots the result
//! in a git repository.
//!
//! # Commands
//!
//! - `backup` - Split the dump and commit the changes to git
//! - `split` - Split the dump only
//! - `version` - Show version information

mod commands;
mod config;

use clap::{Args, Parser, Subcommand};
use ldifbackup_core::{Dialect, MissingKeyPolicy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Back up an LDAP directory as one LDIF file per entry, versioned in git.
#[derive(Parser)]
#[command(name = "ldif-git-backup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (TOML). Defaults to $LDIF_GIT_BACKUP_CONFIG when set
    #[arg(global = true, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory (the git work tree for `backup`)
    #[arg(global = true, short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report warnings and errors
    #[arg(global = true, short, long)]
    quiet: bool,

    /// Print the run summary as JSON
    #[arg(global = true, long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the dump and commit the changes to git
    Backup {
        #[command(flatten)]
        run: RunArgs,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Split the dump into the output directory without touching git
    Split {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Show version information
    Version,
}

/// Input and output options shared by `backup` and `split`.
#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Read the dump from a file
    #[arg(long, value_name = "FILE", conflicts_with_all = ["command", "stdin"])]
    pub input: Option<PathBuf>,

    /// Read the dump from a command's output [default: /usr/sbin/slapcat -n 1]
    #[arg(long, value_name = "CMD", conflicts_with = "stdin")]
    pub command: Option<String>,

    /// Read the dump from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Input format: unwrapped, wrapped or versioned [default: wrapped]
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<Dialect>,

    /// Attribute whose value names each file [default: entryUUID]
    #[arg(long, value_name = "ATTR")]
    pub key_attribute: Option<String>,

    /// Leave this attribute out of the output (repeatable)
    #[arg(long, value_name = "ATTR")]
    pub exclude: Vec<String>,

    /// Write every entry to this single file instead
    #[arg(long, value_name = "NAME")]
    pub aggregate: Option<String>,

    /// Extension of per-entry files [default: ldif]
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// What to do with entries lacking the key attribute: abort or skip [default: abort]
    #[arg(long, value_name = "POLICY")]
    pub on_missing_key: Option<MissingKeyPolicy>,

    /// Compute everything but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Version store options of `backup`.
#[derive(Args, Debug, Default)]
pub(crate) struct StoreArgs {
    /// Do not stage written files
    #[arg(long)]
    pub no_add: bool,

    /// Do not remove files of deleted entries
    #[arg(long)]
    pub no_remove: bool,

    /// Do not commit
    #[arg(long)]
    pub no_commit: bool,

    /// Run `git gc` after committing
    #[arg(long)]
    pub gc: bool,

    /// Commit message
    #[arg(short, long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Create the repository if the output directory is not one yet
    #[arg(long)]
    pub init: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Backup { run, store } => {
            let file = config::FileConfig::load(cli.config.as_deref())?;
            let resolved = config::resolve(&file, cli.output.as_deref(), &run, Some(&store))?;
            commands::backup::run(&resolved, store.init, cli.json)?;
        }
        Commands::Split { run } => {
            let file = config::FileConfig::load(cli.config.as_deref())?;
            let resolved = config::resolve(&file, cli.output.as_deref(), &run, None)?;
            commands::split::run(&resolved, cli.json)?;
        }
        Commands::Version => {
            println!("ldif-git-backup v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
