//! Configuration types for loading hieradata.
//!
//! `StoreConfig` describes where documents live and how they are discovered.
//! `LoadOptions` carries the per-load directives.

use std::path::PathBuf;

use crate::error::ValidateError;

/// Extensions selected when none are given.
pub const DEFAULT_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Filesystem options for a [`DocumentStore`](crate::DocumentStore).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct StoreConfig {
    /// Root directory of the hieradata tree. Source identities are relative to it.
    pub root: PathBuf,
    /// File extensions to load, with or without the leading `.`.
    pub extensions: Vec<String>,
    /// Exclude patterns (glob format), matched against the relative path and the file name.
    pub exclude: Vec<String>,
    /// Whether to follow symbolic links.
    ///
    /// **Defaults to `false`**: a followed link may point outside `root`.
    pub follow_links: bool,
    /// Maximum directory traversal depth (default: 64).
    pub max_depth: usize,
    /// Maximum file size in bytes (default: 10 MB).
    pub max_file_size: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_owned()).collect(),
            exclude: Vec::new(),
            follow_links: false,
            max_depth: 64,
            max_file_size: 10_485_760,
        }
    }
}

impl StoreConfig {
    /// Config for `root` with the default extensions.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Replace the extension list.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Extensions normalised to carry their leading `.` (`yaml` becomes `.yaml`).
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::InvalidArgument`] if the list is empty or
    /// contains an empty extension.
    pub fn normalized_extensions(&self) -> Result<Vec<String>, ValidateError> {
        if self.extensions.is_empty() {
            return Err(ValidateError::InvalidArgument(
                "extensions should be a non-empty list".to_owned(),
            ));
        }

        self.extensions
            .iter()
            .map(|ext| {
                let trimmed = ext.trim();
                if trimmed.is_empty() || trimmed == "." {
                    return Err(ValidateError::InvalidArgument(format!(
                        "invalid extension {ext:?}"
                    )));
                }
                if trimmed.starts_with('.') {
                    Ok(trimmed.to_owned())
                } else {
                    Ok(format!(".{trimmed}"))
                }
            })
            .collect()
    }
}

/// Directives for a single [`DocumentStore::load`](crate::DocumentStore::load).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct LoadOptions {
    /// Silently skip documents that are empty instead of reporting them.
    pub ignore_empty: bool,
}

impl LoadOptions {
    /// Options that skip empty documents without a diagnostic.
    #[must_use]
    pub fn ignore_empty() -> Self {
        Self { ignore_empty: true }
    }
}
