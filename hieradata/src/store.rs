//! Loaded hieradata and the store that discovers and parses it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Once;

use serde::Serialize;
use serde_json::Value;

use crate::check::CheckFailure;
use crate::config::{LoadOptions, StoreConfig};
use crate::error::{LoadError, LoadErrorKind, ValidateError};
use crate::key::KeySpec;
use crate::source::SourceId;
use crate::source::fs::{find_files, read_file_bounded};
use crate::validator::Validator;

/// One parsed source: its top-level keys and their decoded values.
pub type Document = serde_json::Map<String, Value>;

/// Loaded documents plus the diagnostics of the load that produced them.
///
/// A source that failed to load has a diagnostic in `load_errors` and no
/// entry in `data`. Iteration over `data` is ordered by [`SourceId`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    data: BTreeMap<SourceId, Document>,
    load_errors: Vec<LoadError>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from in-memory documents, with no load diagnostics.
    #[must_use]
    pub fn from_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = (SourceId, Document)>,
    {
        Self {
            data: documents.into_iter().collect(),
            load_errors: Vec::new(),
        }
    }

    /// Insert (or replace) a source.
    pub fn insert(&mut self, id: SourceId, document: Document) -> Option<Document> {
        self.data.insert(id, document)
    }

    /// Record a load diagnostic.
    pub fn push_load_error(&mut self, error: LoadError) {
        self.load_errors.push(error);
    }

    #[must_use]
    pub fn data(&self) -> &BTreeMap<SourceId, Document> {
        &self.data
    }

    #[must_use]
    pub fn load_errors(&self) -> &[LoadError] {
        &self.load_errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// A validator over this dataset.
    #[must_use]
    pub fn validator(&self) -> Validator<'_> {
        Validator::new(self)
    }
}

/// Discovers YAML documents under a root directory and loads them.
///
/// ```rust,no_run
/// use hieradata::{DocumentStore, LoadOptions, StoreConfig, check};
///
/// let mut store = DocumentStore::new(StoreConfig::new("spec/fixtures/hieradata")).unwrap();
/// store.load(LoadOptions::default());
/// store
///     .validate("ntp::servers", &[], check::non_empty())
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DocumentStore {
    config: StoreConfig,
    extensions: Vec<String>,
    dataset: Dataset,
}

impl DocumentStore {
    /// Create a store. Nothing is read until [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::InvalidArgument`] if the extension list is
    /// empty or contains an empty extension.
    pub fn new(config: StoreConfig) -> Result<Self, ValidateError> {
        let extensions = config.normalized_extensions()?;
        Ok(Self {
            config,
            extensions,
            dataset: Dataset::new(),
        })
    }

    /// Configured extensions, each with its leading `.`.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Discover and parse every eligible file, replacing any previous state.
    ///
    /// Never fails: unreadable, unparsable and empty files are recorded in
    /// [`load_errors`](Self::load_errors) and left out of [`data`](Self::data).
    pub fn load(&mut self, options: LoadOptions) -> &mut Self {
        let mut dataset = Dataset::new();
        let (files, discovery_errors) = find_files(&self.config, &self.extensions);
        for error in discovery_errors {
            tracing::warn!("{error}");
            dataset.push_load_error(error);
        }

        for file in &files {
            match self.load_file(file, options) {
                Ok(Some((id, document))) => {
                    tracing::debug!(source = %id, keys = document.len(), "loaded");
                    dataset.insert(id, document);
                }
                Ok(None) => tracing::debug!(file = %file.display(), "skipped empty file"),
                Err(error) => {
                    tracing::warn!("{error}");
                    dataset.push_load_error(error);
                }
            }
        }

        tracing::info!(
            root = %self.config.root.display(),
            sources = dataset.len(),
            errors = dataset.load_errors().len(),
            "hieradata loaded"
        );
        self.dataset = dataset;
        self
    }

    /// Load, then fail with the first diagnostic if there was any.
    ///
    /// # Errors
    ///
    /// Returns the first load diagnostic.
    #[deprecated(note = "use `load` and inspect `load_errors` instead")]
    pub fn load_strict(&mut self, ignore_empty: bool) -> Result<&mut Self, LoadError> {
        static DEPRECATION: Once = Once::new();
        DEPRECATION.call_once(|| {
            tracing::warn!("`load_strict` is deprecated, use `load` and inspect `load_errors`");
        });

        self.load(LoadOptions { ignore_empty });
        if let Some(first) = self.dataset.load_errors.first() {
            return Err(first.clone());
        }
        Ok(self)
    }

    fn load_file(
        &self,
        file: &Path,
        options: LoadOptions,
    ) -> Result<Option<(SourceId, Document)>, LoadError> {
        let id = SourceId::from_path(&self.config.root, file)?;
        let content = read_file_bounded(file, self.config.max_file_size)?;
        match parse_document(&content, file)? {
            Some(document) => Ok(Some((id, document))),
            None if options.ignore_empty => Ok(None),
            None => Err(LoadError::empty(file)),
        }
    }

    /// Loaded documents keyed by source.
    #[must_use]
    pub fn data(&self) -> &BTreeMap<SourceId, Document> {
        self.dataset.data()
    }

    /// Diagnostics of the last load.
    #[must_use]
    pub fn load_errors(&self) -> &[LoadError] {
        self.dataset.load_errors()
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn validator(&self) -> Validator<'_> {
        self.dataset.validator()
    }

    /// Shorthand for `self.validator().validate(..)`.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub fn validate<K, F>(
        &self,
        key: K,
        required_sources: &[SourceId],
        check: F,
    ) -> Result<(), ValidateError>
    where
        K: Into<KeySpec>,
        F: FnMut(&Value) -> Result<(), CheckFailure>,
    {
        self.validator().validate(key, required_sources, check)
    }
}

/// Parse one file's content.
///
/// Returns `Ok(None)` when the document is empty (no document, `null`, or `false`).
/// Only the first document of a multi-document stream is kept.
fn parse_document(content: &str, path: &Path) -> Result<Option<Document>, LoadError> {
    if content.trim().is_empty() {
        return Ok(None);
    }

    let documents: Vec<Value> = serde_saphyr::from_multiple(content)
        .map_err(|e| LoadError::new(path, LoadErrorKind::ParseError, e.to_string()))?;

    let mut documents = documents.into_iter();
    let first = documents.next();
    if documents.next().is_some() {
        tracing::debug!(file = %path.display(), "ignoring documents after the first");
    }

    match first {
        None | Some(Value::Null | Value::Bool(false)) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(LoadError::new(
            path,
            LoadErrorKind::NotAMapping,
            format!("document root must be a mapping, found {}", kind_name(&other)),
        )),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
