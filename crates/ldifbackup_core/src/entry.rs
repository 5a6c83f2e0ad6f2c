//! LDIF data model: attributes, entries and entry keys.

use std::fmt;

/// One logical `name: value` line of an entry.
///
/// The text is stored without its line terminator. For wrapped input it is
/// the fold of the attribute's physical lines, with exactly one leading
/// space removed from each continuation and nothing else changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    line: String,
}

impl Attribute {
    /// Creates an attribute from its logical text.
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    /// The full logical text, e.g. `uid: jdoe`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// The attribute description before the first `:`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.line.split_once(':').map_or(&self.line, |(name, _)| name)
    }

    /// The plain value after `name: `, or `None` for base64 (`::`),
    /// URL (`:<`) or malformed lines.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        let (_, rest) = self.line.split_once(':')?;
        if rest.starts_with(':') || rest.starts_with('<') {
            return None;
        }
        Some(rest.strip_prefix(' ').unwrap_or(rest))
    }

    /// Consumes the attribute and returns its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.line
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// The value of the key attribute for one entry.
///
/// Never empty: an empty value is treated the same as an absent attribute,
/// which is represented as `Option<EntryKey>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey(String);

impl EntryKey {
    /// Creates a key, returning `None` for an empty value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key can name a file inside the output directory.
    #[must_use]
    pub fn is_safe_file_stem(&self) -> bool {
        self.0 != "." && self.0 != ".." && !self.0.contains(['/', '\0'])
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One directory record: its attributes in input order and, when key
/// extraction is enabled, its key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    attributes: Vec<Attribute>,
    key: Option<EntryKey>,
}

impl Entry {
    /// Creates an empty entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entry from attributes and a key.
    #[must_use]
    pub fn from_parts(attributes: Vec<Attribute>, key: Option<EntryKey>) -> Self {
        Self { attributes, key }
    }

    /// Attributes in input order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The extracted key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&EntryKey> {
        self.key.as_ref()
    }

    /// Returns true if the entry has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// The distinguished name from the entry's `dn:` line.
    ///
    /// Base64 DNs (`dn:: `) are returned still encoded.
    #[must_use]
    pub fn dn(&self) -> Option<&str> {
        let first = self.attributes.first()?;
        if !first.name().eq_ignore_ascii_case("dn") {
            return None;
        }
        let (_, rest) = first.as_str().split_once(':')?;
        let rest = rest.strip_prefix(':').unwrap_or(rest);
        Some(rest.strip_prefix(' ').unwrap_or(rest))
    }

    /// A short description of the entry for messages: the DN, else the
    /// first line, else `<empty entry>`.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.dn(), self.attributes.first()) {
            (Some(dn), _) => dn.to_string(),
            (None, Some(first)) => format!("starting {:?}", first.as_str()),
            (None, None) => "<empty entry>".to_string(),
        }
    }

    /// Serialises the entry as written to output: every attribute on its
    /// own line followed by one blank line.
    #[must_use]
    pub fn to_ldif(&self) -> String {
        let size: usize = self.attributes.iter().map(|a| a.line.len() + 1).sum();
        let mut out = String::with_capacity(size + 1);
        for attribute in &self.attributes {
            out.push_str(&attribute.line);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_name_and_value() {
        let attr = Attribute::new("uid: U1");
        assert_eq!(attr.name(), "uid");
        assert_eq!(attr.value(), Some("U1"));
    }

    #[test]
    fn attribute_value_forms() {
        assert_eq!(Attribute::new("jpegPhoto:: AAEC").value(), None);
        assert_eq!(Attribute::new("labeledURI:< file:///x").value(), None);
        assert_eq!(Attribute::new("description:").value(), Some(""));
        assert_eq!(Attribute::new("no colon").value(), None);
        assert_eq!(Attribute::new("no colon").name(), "no colon");
    }

    #[test]
    fn entry_key_empty_is_absent() {
        assert_eq!(EntryKey::new(""), None);
        assert_eq!(EntryKey::new("U1").unwrap().as_str(), "U1");
    }

    #[test]
    fn entry_key_file_safety() {
        assert!(EntryKey::new("4d3f-11ee").unwrap().is_safe_file_stem());
        assert!(!EntryKey::new("..").unwrap().is_safe_file_stem());
        assert!(!EntryKey::new("a/b").unwrap().is_safe_file_stem());
    }

    #[test]
    fn entry_to_ldif() {
        let entry = Entry::from_parts(
            vec![Attribute::new("dn: cn=a"), Attribute::new("uid: U1")],
            EntryKey::new("U1"),
        );
        assert_eq!(entry.to_ldif(), "dn: cn=a\nuid: U1\n\n");
        assert_eq!(entry.len(), 2);
    }

    #[test]
    fn empty_entry_to_ldif() {
        assert_eq!(Entry::new().to_ldif(), "\n");
        assert!(Entry::new().is_empty());
    }

    #[test]
    fn entry_dn_and_describe() {
        let entry = Entry::from_parts(vec![Attribute::new("dn: cn=a,dc=x")], None);
        assert_eq!(entry.dn(), Some("cn=a,dc=x"));
        assert_eq!(entry.describe(), "cn=a,dc=x");

        let b64 = Entry::from_parts(vec![Attribute::new("dn:: Y249YQ==")], None);
        assert_eq!(b64.dn(), Some("Y249YQ=="));

        let no_dn = Entry::from_parts(vec![Attribute::new("cn: a")], None);
        assert_eq!(no_dn.dn(), None);
        assert_eq!(no_dn.describe(), "starting \"cn: a\"");
        assert_eq!(Entry::new().describe(), "<empty entry>");
    }
}
