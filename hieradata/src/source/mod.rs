//! Source identities and discovery.
//!
//! A source is one document on disk, identified by its path relative to the
//! store root with the extension kept, so `common.yaml` and `common.yml` (or
//! `a/common.yaml` and `b/common.yaml`) never collide.

pub mod fs;

use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadErrorKind};

/// Identity of a loaded source: its `/`-separated path relative to the root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Build the identity of `path` relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns an [`OutsideRoot`](LoadErrorKind::OutsideRoot) diagnostic if
    /// `path` is not under `root`, and an
    /// [`InvalidEncoding`](LoadErrorKind::InvalidEncoding) one if a component
    /// of the relative path is not UTF-8. Distinct paths always yield distinct
    /// identities.
    pub fn from_path(root: &Path, path: &Path) -> Result<Self, LoadError> {
        let outside = || {
            LoadError::new(
                path,
                LoadErrorKind::OutsideRoot,
                "path is not under the root directory",
            )
        };
        let relative = path.strip_prefix(root).map_err(|_| outside())?;

        let mut parts = Vec::new();
        for component in relative.components() {
            if let Component::Normal(part) = component {
                let part = part.to_str().ok_or_else(|| {
                    LoadError::new(
                        path,
                        LoadErrorKind::InvalidEncoding,
                        "file path is not valid UTF-8",
                    )
                })?;
                parts.push(part);
            }
        }
        if parts.is_empty() {
            return Err(outside());
        }
        Ok(Self(parts.join("/")))
    }

    /// The identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for SourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
