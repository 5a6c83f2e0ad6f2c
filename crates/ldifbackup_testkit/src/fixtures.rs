//! Test fixtures and output-directory helpers.
//!
//! Provides sample documents for each dialect and convenience functions
//! for running the pipeline against a temporary output directory.

use ldifbackup_core::{
    CoreResult, Dialect, Entry, OutputMode, Pipeline, RunConfig, RunSummary, Segmenter,
    SegmenterConfig,
};
use ldifbackup_source::MemorySource;
use ldifbackup_store::MemoryStore;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// `entryUUID` values of the three entries in every sample document.
pub const SAMPLE_KEYS: [&str; 3] = [
    "5f0c2a44-8e1b-103c-9c1a-0b7d2f6e0001",
    "5f0c2a44-8e1b-103c-9c1a-0b7d2f6e0002",
    "5f0c2a44-8e1b-103c-9c1a-0b7d2f6e0003",
];

/// Three entries, one attribute per line.
pub const UNWRAPPED_SAMPLE: &str = "\
dn: dc=example,dc=org
objectClass: dcObject
objectClass: organization
dc: example
o: Example Org
entryUUID: 5f0c2a44-8e1b-103c-9c1a-0b7d2f6e0001

dn: cn=admin,dc=example,dc=org
objectClass: organizationalRole
objectClass: simpleSecurityObject
cn: admin
userPassword: {SSHA}q1w2e3r4t5y6u7i8o9p0
entryUUID: 5f0c2a44-8e1b-103c-9c1a-0b7d2f6e0002

dn: uid=jdoe,ou=people,dc=example,dc=org
objectClass: inetOrgPerson
uid: jdoe
cn: John Doe
sn: Doe
description: Works on the directory team and maintains the nightly backup jobs
entryUUID: 5f0c2a44-8e1b-103c-9c1a-0b7d2f6e0003

";

/// The same entries as [`UNWRAPPED_SAMPLE`], folded at 40 columns.
pub const WRAPPED_SAMPLE: &str = "\
dn: dc=example,dc=org
objectClass: dcObject
objectClass: organization
dc: example
o: Example Org
entryUUID: 5f0c2a44-8e1b-103c-9c1a-0b7d2f6e00
 01

dn: cn=admin,dc=example,dc=org
objectClass: organizationalRole
objectClass: simpleSecurityObject
cn: admin
userPassword: {SSHA}q1w2e3r4t5y6u7i8o9p0
entryUUID: 5f0c2a44-8e1b-103c-9c1a-0b7d2f6e00
 02

dn: uid=jdoe,ou=people,dc=example,dc=org
objectClass: inetOrgPerson
uid: jdoe
cn: John Doe
sn: Doe
description: Works on the directory team
  and maintains the nightly backup jobs
entryUUID: 5f0c2a44-8e1b-103c-9c1a-0b7d2f6e00
 03

";

/// The same entries in the versioned dialect, as produced by `ldapsearch`:
/// header comments, a version line, comments between and inside entries,
/// and runs of blank lines.
pub const VERSIONED_SAMPLE: &str = "\
# extended LDIF
#
# LDAPv3
# base <dc=example,dc=org> with scope subtree
# filter: (objectclass=*)
#

version: 1

# example.org
dn: dc=example,dc=org
objectClass: dcObject
objectClass: organization
dc: example
o: Example Org
entryUUID: 5f0c2a44-8e1b-103c-9c1a-0b7d2f6e00
 01


# admin, example.org
dn: cn=admin,dc=example,dc=org
objectClass: organizationalRole
objectClass: simpleSecurityObject
cn: admin
userPassword: {SSHA}q1w2e3r4t5y6u7i8o9p0
entryUUID: 5f0c2a44-8e1b-103c-9c1a-0b7d2f6e00
 02

# jdoe, people, example.org
dn: uid=jdoe,ou=people,dc=example,dc=org
objectClass: inetOrgPerson
uid: jdoe
# a comment inside the entry,
  wrapped onto a second line
cn: John Doe
sn: Doe
description: Works on the directory team
  and maintains the nightly backup jobs
entryUUID: 5f0c2a44-8e1b-103c-9c1a-0b7d2f6e00
 03

# search result
# search: 2
# result: 0 Success

# numEntries: 3
";

/// Returns the sample document for `dialect`.
#[must_use]
pub fn sample(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Unwrapped => UNWRAPPED_SAMPLE,
        Dialect::Wrapped => WRAPPED_SAMPLE,
        Dialect::Versioned => VERSIONED_SAMPLE,
    }
}

/// A temporary output directory with automatic cleanup.
pub struct TestOutput {
    dir: TempDir,
}

impl TestOutput {
    /// Creates an empty output directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A default run configuration writing here with the given dialect.
    pub fn config(&self, dialect: Dialect) -> RunConfig {
        RunConfig::new(self.path()).with_segmenter(SegmenterConfig::new().dialect(dialect))
    }

    /// Reads a file from the directory.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).expect("Failed to read output file")
    }

    /// Creates a file in the directory.
    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.path().join(name), content).expect("Failed to write file")
    }

    /// Sorted names of the regular files at the top level.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("Failed to list output directory")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Every top-level file with its content.
    pub fn contents(&self) -> BTreeMap<String, String> {
        self.file_names()
            .into_iter()
            .map(|name| {
                let content = self.read(&name);
                (name, content)
            })
            .collect()
    }
}

impl Default for TestOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs segment and write only.
pub fn split(config: &RunConfig, input: &str) -> CoreResult<RunSummary> {
    Pipeline::new(config)?.run_without_store(MemorySource::new(input))
}

/// Runs the full pipeline against an in-memory store.
pub fn backup(config: &RunConfig, input: &str, store: &mut MemoryStore) -> CoreResult<RunSummary> {
    Pipeline::new(config)?.run(MemorySource::new(input), store)
}

/// Segments `input` in per-entry mode and collects every entry.
pub fn segment(config: &SegmenterConfig, input: &str) -> CoreResult<Vec<Entry>> {
    Segmenter::new(MemorySource::new(input), config, &OutputMode::per_entry())?.collect()
}

/// Returns true if a `git` binary can be run.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
