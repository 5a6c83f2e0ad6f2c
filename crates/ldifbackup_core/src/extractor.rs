//! Key attribute extraction.

use crate::config::validate_attribute_name;
use crate::entry::{Attribute, EntryKey};
use crate::error::CoreResult;

/// Extracts the key attribute's value from logical attributes.
///
/// A match is an attribute of the form `<name>: <value>` whose name equals
/// the key attribute (ASCII case-insensitively) and whose value is
/// non-empty. Base64 (`::`) and URL (`:<`) forms never match.
///
/// First match wins: callers stop offering attributes once a key is found.
#[derive(Debug, Clone)]
pub struct FilenameExtractor {
    key_attribute: String,
}

impl FilenameExtractor {
    /// Creates an extractor for `key_attribute`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name is malformed.
    pub fn new(key_attribute: &str) -> CoreResult<Self> {
        validate_attribute_name(key_attribute)?;
        Ok(Self {
            key_attribute: key_attribute.to_string(),
        })
    }

    /// Returns the key carried by `attribute`, if it is the key attribute.
    #[must_use]
    pub fn extract(&self, attribute: &Attribute) -> Option<EntryKey> {
        let (name, rest) = attribute.as_str().split_once(':')?;
        if !name.eq_ignore_ascii_case(&self.key_attribute) {
            return None;
        }
        let value = rest.strip_prefix(' ')?;
        EntryKey::new(value)
    }
}
