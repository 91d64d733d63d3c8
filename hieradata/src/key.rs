//! Key specifiers: which keys of a source a validation applies to.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::ValidateError;
use crate::store::Document;

/// An exact key or a pattern matched against every key of a source.
#[derive(Debug, Clone)]
pub enum KeySpec {
    /// Matches the key equal to this string.
    Exact(String),
    /// Matches every key the regex finds a match in (unanchored).
    Pattern(Regex),
}

impl KeySpec {
    #[must_use]
    pub fn exact(key: impl Into<String>) -> Self {
        Self::Exact(key.into())
    }

    /// Compile `pattern` into a pattern specifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::InvalidArgument`] if `pattern` is not a valid regex.
    pub fn pattern(pattern: &str) -> Result<Self, ValidateError> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| ValidateError::InvalidArgument(format!("invalid key pattern: {e}")))
    }

    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == key,
            Self::Pattern(re) => re.is_match(key),
        }
    }

    /// Keys of `document` this specifier selects, in document order.
    #[must_use]
    pub fn matching_keys<'d>(&self, document: &'d Document) -> Vec<&'d str> {
        match self {
            Self::Exact(exact) => document
                .get_key_value(exact.as_str())
                .map(|(k, _)| vec![k.as_str()])
                .unwrap_or_default(),
            Self::Pattern(re) => document
                .keys()
                .map(String::as_str)
                .filter(|k| re.is_match(k))
                .collect(),
        }
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(key) => write!(f, "{key:?}"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Parses `/regex/` as a pattern and anything else (the empty string included)
/// as an exact key, agreeing with `From<&str>` for every text not starting
/// with `/`.
///
/// An exact key that itself starts with `/` has no text form; select it with an
/// anchored pattern instead, e.g. `/^[/]etc[/]hosts$/` for the key `/etc/hosts`.
impl FromStr for KeySpec {
    type Err = ValidateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('/') {
            Some(rest) => match rest.strip_suffix('/') {
                Some(pattern) if !pattern.is_empty() => Self::pattern(pattern),
                _ => Err(ValidateError::InvalidArgument(
                    "search key must be an exact key or a pattern".to_owned(),
                )),
            },
            None => Ok(Self::Exact(s.to_owned())),
        }
    }
}

impl From<&str> for KeySpec {
    fn from(key: &str) -> Self {
        Self::Exact(key.to_owned())
    }
}

impl From<String> for KeySpec {
    fn from(key: String) -> Self {
        Self::Exact(key)
    }
}

impl From<Regex> for KeySpec {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<&Regex> for KeySpec {
    fn from(re: &Regex) -> Self {
        Self::Pattern(re.clone())
    }
}

impl From<&KeySpec> for KeySpec {
    fn from(spec: &KeySpec) -> Self {
        spec.clone()
    }
}
