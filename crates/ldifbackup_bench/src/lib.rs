//! Benchmark utilities.
//!
//! Generates slapcat-like dumps of a given size in each input dialect.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use ldifbackup_core::Dialect;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Fold column used by `slapcat`.
pub const FOLD_WIDTH: usize = 76;

fn random_text(rng: &mut impl Rng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn push_folded(out: &mut String, line: &str, dialect: Dialect) {
    if dialect == Dialect::Unwrapped || line.len() <= FOLD_WIDTH {
        out.push_str(line);
        out.push('\n');
        return;
    }
    let (first, mut rest) = line.split_at(FOLD_WIDTH);
    out.push_str(first);
    out.push('\n');
    while !rest.is_empty() {
        let (chunk, tail) = rest.split_at(rest.len().min(FOLD_WIDTH - 1));
        out.push(' ');
        out.push_str(chunk);
        out.push('\n');
        rest = tail;
    }
}

/// Generates a dump of `entries` entries, each carrying an `entryUUID`
/// and a description of about `value_len` characters.
pub fn generate_dump(dialect: Dialect, entries: usize, value_len: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut out = String::new();
    if dialect == Dialect::Versioned {
        out.push_str("# generated\nversion: 1\n\n");
    }

    for i in 0..entries {
        if dialect == Dialect::Versioned {
            out.push_str(&format!("# entry {i}\n"));
        }
        let uid = format!("user{i:06}");
        let lines = [
            format!("dn: uid={uid},ou=people,dc=example,dc=org"),
            "objectClass: inetOrgPerson".to_string(),
            format!("uid: {uid}"),
            format!("cn: {}", random_text(&mut rng, 12)),
            format!("userPassword: {{SSHA}}{}", random_text(&mut rng, 32)),
            format!("description: {}", random_text(&mut rng, value_len)),
            format!("entryUUID: {:08x}-0000-4000-8000-{i:012x}", rng.gen::<u32>()),
        ];
        for line in &lines {
            push_folded(&mut out, line, dialect);
        }
        out.push('\n');
    }
    out
}
