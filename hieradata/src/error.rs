//! Error types for loading and validating hieradata.
//!
//! Two channels with different audiences:
//! - [`LoadError`] is a diagnostic collected while loading. Loading never fails
//!   because of one; the diagnostics surface at validation time.
//! - [`ValidateError`] is returned by a validation call and is terminal for it.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::source::SourceId;

/// The kind of failure that kept a file out of the loaded data.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadErrorKind {
    /// An I/O error occurred while reading the file.
    IoError,
    /// The file exceeded the configured maximum size limit.
    FileTooLarge,
    /// The file content, or its path relative to the root, is not valid UTF-8.
    InvalidEncoding,
    /// The file content could not be parsed as YAML.
    ParseError,
    /// The document parsed, but its root is not a mapping of keys to values.
    NotAMapping,
    /// The document is empty (no content, `~`/`null`, or `false`).
    Empty,
    /// The resolved path is outside the root directory (symlink escape).
    OutsideRoot,
    /// A directory traversal error (permission denied, loop detected, etc.).
    WalkError,
    /// An exclude glob pattern could not be parsed.
    InvalidExcludePattern,
}

/// A load diagnostic: a file that could not be added to the loaded data.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct LoadError {
    /// The file (or pattern, for [`LoadErrorKind::InvalidExcludePattern`]) at fault.
    pub file: PathBuf,
    /// The kind of failure.
    pub kind: LoadErrorKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl LoadError {
    pub(crate) fn new(
        file: impl Into<PathBuf>,
        kind: LoadErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn empty(file: impl Into<PathBuf>) -> Self {
        Self::new(file, LoadErrorKind::Empty, "file is empty")
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LoadErrorKind::Empty => write!(f, "Yaml file is empty: {}", self.file.display()),
            _ => write!(f, "Error in file {}: {}", self.file.display(), self.message),
        }
    }
}

impl std::error::Error for LoadError {}

/// Errors returned by [`Validator`](crate::Validator) and store construction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidateError {
    /// Malformed caller input.
    #[error("{0}")]
    InvalidArgument(String),

    /// Validation was attempted before any data was loaded.
    #[error("No data available, try `load` first")]
    NoData,

    /// One or more sources failed to load; the data cannot be trusted.
    #[error("Errors occurred during data load:\n{}\n", join_lines(.errors))]
    DataIntegrity {
        /// Every diagnostic collected by the load.
        errors: Vec<LoadError>,
    },

    /// The key specifier matched nothing in any source.
    #[error("No match for {key} was found in any source")]
    NoMatch {
        /// The key specifier, as displayed by [`KeySpec`](crate::KeySpec).
        key: String,
    },

    /// A matched value failed its check.
    #[error("{key} is invalid in {source_id}: {message}")]
    Validation {
        /// The matched key.
        key: String,
        /// The source holding the value.
        source_id: SourceId,
        /// The check's failure message.
        message: String,
    },

    /// Some required sources never produced a match.
    #[error("No match for {key} was found in: {}", join_ids(.missing))]
    RequiredSourcesUnsatisfied {
        /// The key specifier, as displayed by [`KeySpec`](crate::KeySpec).
        key: String,
        /// Required sources left unsatisfied, in the order they were given.
        missing: Vec<SourceId>,
    },

    /// A check failed with something other than an expectation; passed through as is.
    #[error(transparent)]
    Check(#[from] anyhow::Error),
}

fn join_lines(errors: &[LoadError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_ids(ids: &[SourceId]) -> String {
    ids.iter()
        .map(SourceId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = LoadError::new(
            "/data/common.yaml",
            LoadErrorKind::ParseError,
            "did not find expected key",
        );
        assert_eq!(
            err.to_string(),
            "Error in file /data/common.yaml: did not find expected key"
        );
    }

    #[test]
    fn test_empty_display() {
        let err = LoadError::empty("/data/empty.yaml");
        assert_eq!(err.to_string(), "Yaml file is empty: /data/empty.yaml");
    }

    #[test]
    fn test_data_integrity_embeds_every_diagnostic() {
        let err = ValidateError::DataIntegrity {
            errors: vec![
                LoadError::empty("a.yaml"),
                LoadError::new("b.yaml", LoadErrorKind::ParseError, "bad indent"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Errors occurred during data load:\n"));
        assert!(msg.contains("Yaml file is empty: a.yaml"));
        assert!(msg.contains("Error in file b.yaml: bad indent"));
    }

    #[test]
    fn test_required_sources_lists_missing() {
        let err = ValidateError::RequiredSourcesUnsatisfied {
            key: "\"host\"".to_owned(),
            missing: vec![SourceId::from("db.yaml"), SourceId::from("web.yaml")],
        };
        assert_eq!(
            err.to_string(),
            "No match for \"host\" was found in: db.yaml, web.yaml"
        );
    }

    #[test]
    fn test_check_error_is_transparent() {
        let err = ValidateError::from(anyhow::anyhow!("parser exploded"));
        assert_eq!(err.to_string(), "parser exploded");
    }
}
