//! End-to-end runs over the sample documents.

use ldifbackup_core::{
    CoreError, Dialect, MissingKeyPolicy, OutputMode, Pipeline, RunConfig, SegmenterConfig,
    StoreActions, WriterConfig,
};
use ldifbackup_source::{CommandSource, MemorySource};
use ldifbackup_store::{GitStore, MemoryStore, VersionStore};
use ldifbackup_testkit::prelude::*;
use std::process::Command;

const ALL_DIALECTS: [Dialect; 3] = [Dialect::Unwrapped, Dialect::Wrapped, Dialect::Versioned];

fn expected_files() -> Vec<String> {
    SAMPLE_KEYS.iter().map(|k| format!("{k}.ldif")).collect()
}

#[test]
fn scenario_basic_unwrapped() {
    let out = TestOutput::new();
    let config = RunConfig::new(out.path()).with_segmenter(
        SegmenterConfig::new()
            .dialect(Dialect::Unwrapped)
            .key_attribute("uid"),
    );

    split(&config, "dn: cn=a\nuid: U1\n\n").unwrap();

    assert_eq!(out.file_names(), vec!["U1.ldif"]);
    assert_eq!(out.read("U1.ldif"), "dn: cn=a\nuid: U1\n\n");
}

#[test]
fn scenario_fold() {
    let out = TestOutput::new();
    let config = RunConfig::new(out.path()).with_segmenter(
        SegmenterConfig::new()
            .dialect(Dialect::Wrapped)
            .key_attribute("uid"),
    );

    split(&config, "dn: cn=a\nuid: U1\ndescription: foo\n bar\n\n").unwrap();

    assert_eq!(out.read("U1.ldif"), "dn: cn=a\nuid: U1\ndescription: foobar\n\n");
}

#[test]
fn scenario_exclusion_in_every_dialect() {
    for dialect in ALL_DIALECTS {
        let out = TestOutput::new();
        let mut config = out.config(dialect);
        config.segmenter.exclude.push("userPassword".into());

        split(&config, sample(dialect)).unwrap();

        for (name, content) in out.contents() {
            assert!(
                !content.to_ascii_lowercase().contains("userpassword"),
                "{dialect}: {name} still holds the password"
            );
        }
    }
}

#[test]
fn scenario_missing_key_aborts() {
    let out = TestOutput::new();
    let config = RunConfig::new(out.path()).with_segmenter(
        SegmenterConfig::new()
            .dialect(Dialect::Unwrapped)
            .key_attribute("uid"),
    );
    let mut store = MemoryStore::new();

    let err = backup(
        &config,
        "dn: cn=a\nuid: A\n\ndn: cn=nokey,dc=x\n\ndn: cn=c\nuid: C\n\n",
        &mut store,
    )
    .unwrap_err();

    match err {
        CoreError::MissingKey { entry, .. } => assert_eq!(entry, "cn=nokey,dc=x"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(out.file_names(), vec!["A.ldif"]);
    assert!(store.commits().is_empty());
}

#[test]
fn scenario_missing_key_is_skipped_when_lenient() {
    for dialect in ALL_DIALECTS {
        let out = TestOutput::new();
        let config = out
            .config(dialect)
            .with_writer(WriterConfig::new(out.path()).missing_key(MissingKeyPolicy::Skip));
        let input = format!("{}dn: cn=nokey\ncn: nokey\n\n", sample(dialect));

        let summary = split(&config, &input).unwrap();

        assert_eq!(summary.writer.entries_skipped, 1, "{dialect}");
        assert_eq!(out.file_names(), expected_files(), "{dialect}");
    }
}

#[test]
fn scenario_comment_stripping() {
    let out = TestOutput::new();
    let config = RunConfig::new(out.path()).with_segmenter(
        SegmenterConfig::new()
            .dialect(Dialect::Versioned)
            .key_attribute("uid"),
    );
    let input = "version: 1\n\ndn: cn=a\ndescription: foo\n bar\n# remark\nuid: U1\nnote: x\n y\n\n";

    split(&config, input).unwrap();

    assert_eq!(
        out.read("U1.ldif"),
        "dn: cn=a\ndescription: foobar\nuid: U1\nnote: xy\n\n"
    );
}

#[test]
fn trailing_blank_lines_do_not_abort() {
    for dialect in [Dialect::Unwrapped, Dialect::Wrapped] {
        let out = TestOutput::new();
        let config = RunConfig::new(out.path()).with_segmenter(
            SegmenterConfig::new().dialect(dialect).key_attribute("uid"),
        );

        let summary = split(&config, "dn: cn=a\nuid: U1\n\n\n").unwrap();

        assert_eq!(summary.segmenter.entries, 2, "{dialect}");
        assert_eq!(summary.segmenter.boundaries, 2, "{dialect}");
        assert_eq!(summary.writer.entries_written, 1, "{dialect}");
        assert_eq!(summary.writer.empty_entries, 1, "{dialect}");
        assert_eq!(out.file_names(), vec!["U1.ldif"], "{dialect}");
        assert_eq!(out.read("U1.ldif"), "dn: cn=a\nuid: U1\n\n");
    }
}

#[test]
fn dialects_produce_identical_output() {
    let mut results = Vec::new();
    for dialect in ALL_DIALECTS {
        let out = TestOutput::new();
        split(&out.config(dialect), sample(dialect)).unwrap();
        assert_eq!(out.file_names(), expected_files(), "{dialect}");
        results.push(out.contents());
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
}

#[test]
fn split_is_idempotent() {
    let out = TestOutput::new();
    let config = out.config(Dialect::Versioned);

    split(&config, VERSIONED_SAMPLE).unwrap();
    let first = out.contents();
    split(&config, VERSIONED_SAMPLE).unwrap();

    assert_eq!(out.contents(), first);
}

#[test]
fn aggregate_matches_concatenated_entries() {
    let per_entry = TestOutput::new();
    split(&per_entry.config(Dialect::Wrapped), WRAPPED_SAMPLE).unwrap();

    let aggregate = TestOutput::new();
    let config = aggregate
        .config(Dialect::Wrapped)
        .with_writer(WriterConfig::new(aggregate.path()).mode(OutputMode::aggregate("all.ldif")));
    split(&config, WRAPPED_SAMPLE).unwrap();

    let expected: String = expected_files().iter().map(|f| per_entry.read(f)).collect();
    assert_eq!(aggregate.file_names(), vec!["all.ldif"]);
    assert_eq!(aggregate.read("all.ldif"), expected);
}

#[test]
fn backup_removes_entries_deleted_upstream() {
    let out = TestOutput::new();
    let config = out.config(Dialect::Unwrapped);
    let mut store = MemoryStore::new().rooted(out.path());

    backup(&config, UNWRAPPED_SAMPLE, &mut store).unwrap();
    assert_eq!(store.tracked().unwrap().len(), 3);

    // Drop the admin entry.
    let without_admin: String = UNWRAPPED_SAMPLE
        .split("\n\n")
        .filter(|block| !block.contains("cn=admin"))
        .map(|block| format!("{block}\n\n"))
        .collect();
    let summary = backup(&config, without_admin.trim_end_matches('\n'), &mut store).unwrap();

    assert_eq!(summary.to_remove, 1);
    assert!(summary.committed());
    assert!(!out.path().join(format!("{}.ldif", SAMPLE_KEYS[1])).exists());
    assert_eq!(store.commits().len(), 2);
}

#[test]
fn backup_unchanged_input_does_not_commit() {
    let out = TestOutput::new();
    let config = out.config(Dialect::Wrapped);
    let mut store = MemoryStore::new();

    assert!(backup(&config, WRAPPED_SAMPLE, &mut store).unwrap().committed());
    assert!(!backup(&config, WRAPPED_SAMPLE, &mut store).unwrap().committed());
}

#[test]
fn backup_without_commit_stages_only() {
    let out = TestOutput::new();
    let config = out.config(Dialect::Wrapped).with_store(StoreActions {
        commit: false,
        ..StoreActions::default()
    });
    let mut store = MemoryStore::new();

    let summary = backup(&config, WRAPPED_SAMPLE, &mut store).unwrap();

    assert_eq!(summary.store.unwrap().staged, 3);
    assert!(store.commits().is_empty());
}

#[test]
fn versioned_without_header_fails() {
    let out = TestOutput::new();
    let err = split(&out.config(Dialect::Versioned), UNWRAPPED_SAMPLE).unwrap_err();
    assert!(matches!(err, CoreError::MissingVersion { .. }));
    assert!(out.file_names().is_empty());
}

#[test]
fn empty_input_writes_nothing() {
    for dialect in ALL_DIALECTS {
        let out = TestOutput::new();
        let summary = split(&out.config(dialect), "").unwrap();
        assert_eq!(summary.segmenter.entries, 0);
        assert!(out.file_names().is_empty());
    }
}

#[cfg(unix)]
#[test]
fn command_source_feeds_pipeline() {
    let out = TestOutput::new();
    let input = out.path().join("input.ldif.txt");
    std::fs::write(&input, UNWRAPPED_SAMPLE).unwrap();

    let config = out.config(Dialect::Unwrapped);
    let source = CommandSource::spawn("cat", &[input.to_string_lossy()]).unwrap();
    let summary = Pipeline::new(&config).unwrap().run_without_store(source).unwrap();

    assert_eq!(summary.files, 3);
}

#[cfg(unix)]
#[test]
fn failing_command_is_upstream_error() {
    let out = TestOutput::new();
    let source = CommandSource::spawn("sh", &["-c", "printf 'dn: cn=a\\n'; exit 3"]).unwrap();
    let err = Pipeline::new(&out.config(Dialect::Unwrapped))
        .unwrap()
        .run_without_store(source)
        .unwrap_err();
    assert!(matches!(err, CoreError::Source(_)));
}

#[test]
fn git_backed_backup() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let out = TestOutput::new();
    let mut store = GitStore::init(out.path()).unwrap();
    for (key, value) in [
        ("user.name", "Backup Test"),
        ("user.email", "backup@example.org"),
        ("commit.gpgsign", "false"),
    ] {
        let status = Command::new("git")
            .args(["config", key, value])
            .current_dir(out.path())
            .status()
            .unwrap();
        assert!(status.success());
    }
    out.write("README.md", "backups\n");
    store.stage(&["README.md".to_string()]).unwrap();
    store.commit("readme").unwrap();

    let config = out.config(Dialect::Versioned);
    let pipeline = Pipeline::new(&config).unwrap();

    let first = pipeline.run(MemorySource::new(VERSIONED_SAMPLE), &mut store).unwrap();
    assert!(first.committed());

    let second = pipeline.run(MemorySource::new(VERSIONED_SAMPLE), &mut store).unwrap();
    assert!(!second.committed());

    let first_entry_only = VERSIONED_SAMPLE
        .split("# admin, example.org")
        .next()
        .unwrap()
        .to_string();
    let third = pipeline.run(MemorySource::new(&first_entry_only), &mut store).unwrap();
    assert!(third.committed());
    assert_eq!(third.to_remove, 2);

    let tracked = store.tracked().unwrap();
    assert!(tracked.contains("README.md"));
    assert!(tracked.contains(&format!("{}.ldif", SAMPLE_KEYS[0])));
    assert_eq!(tracked.len(), 2);
}
