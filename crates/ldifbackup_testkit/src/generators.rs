//! Property-based test generators using proptest.
//!
//! Generated documents keep the invariants the segmenter relies on: every
//! entry has a `dn` and a `uid`, generated attribute names never collide
//! with those two, and no value contains a line break.

use ldifbackup_core::Dialect;
use proptest::prelude::*;

/// Key attribute used by generated entries.
pub const KEY_ATTRIBUTE: &str = "uid";

/// One generated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEntry {
    /// Value of the `uid` attribute.
    pub key: String,
    /// Further `(name, value)` attributes, in order.
    pub attributes: Vec<(String, String)>,
}

impl TestEntry {
    /// The logical attribute lines of the entry, starting with `dn` and
    /// `uid`.
    pub fn logical_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("dn: uid={},ou=people,dc=example,dc=org", self.key),
            format!("{KEY_ATTRIBUTE}: {}", self.key),
        ];
        lines.extend(self.attributes.iter().map(|(n, v)| format!("{n}: {v}")));
        lines
    }

    /// The expected per-entry file content.
    pub fn expected_ldif(&self) -> String {
        let mut out = String::new();
        for line in self.logical_lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// Strategy for attribute names that never clash with `dn` or `uid`.
pub fn attribute_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("x[a-zA-Z0-9]{0,11}").expect("Invalid regex")
}

/// Strategy for printable single-line values, possibly with leading,
/// trailing or repeated spaces.
pub fn attribute_value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,120}").expect("Invalid regex")
}

/// Strategy for keys that are safe file stems.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9][A-Za-z0-9-]{0,23}").expect("Invalid regex")
}

/// Strategy for one entry.
pub fn entry_strategy() -> impl Strategy<Value = TestEntry> {
    (
        key_strategy(),
        prop::collection::vec((attribute_name_strategy(), attribute_value_strategy()), 0..6),
    )
        .prop_map(|(key, attributes)| TestEntry { key, attributes })
}

/// Strategy for a document of entries with distinct keys.
pub fn document_strategy() -> impl Strategy<Value = Vec<TestEntry>> {
    prop::collection::vec(entry_strategy(), 0..8).prop_map(|mut entries| {
        let mut seen = std::collections::HashSet::new();
        entries.retain(|e| seen.insert(e.key.clone()));
        entries
    })
}

/// Splits a logical line into physical lines no wider than `width`
/// characters, each continuation starting with one space.
///
/// `width` must be at least 2.
pub fn fold_at(line: &str, width: usize) -> Vec<String> {
    assert!(width >= 2, "fold width must leave room for the leading space");
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= width {
        return vec![line.to_string()];
    }

    let mut lines = vec![chars[..width].iter().collect::<String>()];
    for chunk in chars[width..].chunks(width - 1) {
        let mut continuation = String::from(" ");
        continuation.extend(chunk);
        lines.push(continuation);
    }
    lines
}

/// Joins physical lines produced by [`fold_at`] back into one line.
pub fn unfold(lines: &[String]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            out.push_str(line);
        } else {
            out.push_str(&line[1..]);
        }
    }
    out
}

/// How a document is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendering {
    /// Target dialect.
    pub dialect: Dialect,
    /// Fold column for the wrapping dialects.
    pub width: usize,
    /// Blank lines between entries. Must be 1 for the unwrapped and wrapped
    /// dialects, where every blank line ends an entry.
    pub blank_lines: usize,
    /// Insert a comment line before every entry (versioned dialect only).
    pub comments: bool,
}

impl Rendering {
    /// Single blank lines, no comments, folded at 76 columns.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            width: 76,
            blank_lines: 1,
            comments: false,
        }
    }
}

/// Renders `entries` as an input document.
pub fn render(entries: &[TestEntry], rendering: Rendering) -> String {
    let mut out = String::new();
    if rendering.dialect == Dialect::Versioned {
        out.push_str("version: 1\n\n");
    }

    for entry in entries {
        if rendering.comments && rendering.dialect == Dialect::Versioned {
            for line in fold_at(&format!("# entry {} with a fairly long comment line", entry.key), rendering.width) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        for logical in entry.logical_lines() {
            let physical = match rendering.dialect {
                Dialect::Unwrapped => vec![logical],
                Dialect::Wrapped | Dialect::Versioned => fold_at(&logical, rendering.width),
            };
            for line in physical {
                out.push_str(&line);
                out.push('\n');
            }
        }
        for _ in 0..rendering.blank_lines {
            out.push('\n');
        }
    }
    out
}

/// Strategy for a rendering of `dialect` with a random fold column, and,
/// for the versioned dialect, random blank runs and comments.
pub fn rendering_strategy(dialect: Dialect) -> impl Strategy<Value = Rendering> {
    let blank_max: usize = if dialect == Dialect::Versioned { 4 } else { 1 };
    (8usize..100, 1..=blank_max, any::<bool>()).prop_map(move |(width, blank_lines, comments)| {
        Rendering {
            dialect,
            width,
            blank_lines,
            comments: comments && dialect == Dialect::Versioned,
        }
    })
}
