//! Attribute exclusion.

use crate::entry::Attribute;
use crate::error::{CoreError, CoreResult};
use regex::{Regex, RegexBuilder};

/// Decides whether a logical attribute is left out of the output.
///
/// Built from a list of attribute-name alternatives and compiled once into
/// `^(?:name1|name2|...):[:<]? `, matched case-insensitively against the
/// start of the logical (unfolded) attribute. The optional `:`/`<` also
/// catches base64 and URL values such as `userPassword:: e1NTSEF9...`.
///
/// An empty list excludes nothing.
#[derive(Debug, Clone, Default)]
pub struct AttributeFilter {
    pattern: Option<Regex>,
}

impl AttributeFilter {
    /// Compiles the filter.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the alternatives do not form a valid
    /// regular expression.
    pub fn new<S: AsRef<str>>(names: &[S]) -> CoreResult<Self> {
        let names: Vec<&str> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Ok(Self::default());
        }

        let source = format!("^(?:{}):[:<]? ", names.join("|"));
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| CoreError::config(format!("invalid exclusion pattern {source:?}: {e}")))?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Returns true if `attribute` must be left out.
    #[must_use]
    pub fn excludes(&self, attribute: &Attribute) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|p| p.is_match(attribute.as_str()))
    }

    /// Returns true if the filter can exclude anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(s: &str) -> Attribute {
        Attribute::new(s)
    }

    #[test]
    fn filter_empty_excludes_nothing() {
        let filter = AttributeFilter::new::<&str>(&[]).unwrap();
        assert!(!filter.is_active());
        assert!(!filter.excludes(&attr("userPassword: secret")));
    }

    #[test]
    fn filter_matches_named_attributes() {
        let filter = AttributeFilter::new(&["userPassword", "pwdHistory"]).unwrap();
        assert!(filter.excludes(&attr("userPassword: secret")));
        assert!(filter.excludes(&attr("pwdHistory: 2024")));
        assert!(!filter.excludes(&attr("uid: U1")));
    }

    #[test]
    fn filter_requires_whole_name() {
        let filter = AttributeFilter::new(&["user"]).unwrap();
        assert!(!filter.excludes(&attr("userPassword: secret")));
        assert!(filter.excludes(&attr("user: x")));
    }

    #[test]
    fn filter_matches_only_at_line_start() {
        let filter = AttributeFilter::new(&["userPassword"]).unwrap();
        assert!(!filter.excludes(&attr("description: userPassword: x")));
    }

    #[test]
    fn filter_catches_base64_and_url_forms() {
        let filter = AttributeFilter::new(&["userPassword"]).unwrap();
        assert!(filter.excludes(&attr("userPassword:: e1NTSEF9")));
        assert!(filter.excludes(&attr("userPassword:< file:///etc/pw")));
    }

    #[test]
    fn filter_is_case_insensitive() {
        let filter = AttributeFilter::new(&["userPassword"]).unwrap();
        assert!(filter.excludes(&attr("userpassword: x")));
    }

    #[test]
    fn filter_accepts_pattern_fragments() {
        let filter = AttributeFilter::new(&["pwd.*"]).unwrap();
        assert!(filter.excludes(&attr("pwdChangedTime: 2024")));
    }

    #[test]
    fn filter_invalid_pattern_is_config_error() {
        let err = AttributeFilter::new(&["bad("]).unwrap_err();
        assert!(err.is_configuration());
    }
}
