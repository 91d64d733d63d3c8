//! Key validation across every loaded source.

use serde_json::Value;

use crate::check::CheckFailure;
use crate::error::ValidateError;
use crate::key::KeySpec;
use crate::source::SourceId;
use crate::store::Dataset;

/// Validates keys of a [`Dataset`].
///
/// Holds no state besides the borrowed dataset; every call is independent.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    dataset: &'a Dataset,
}

impl<'a> Validator<'a> {
    #[must_use]
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Apply `check` to every value whose key matches `key`, in every source.
    ///
    /// Each identity in `required_sources` must hold at least one match.
    /// The slice is left untouched; see [`validate_retaining`](Self::validate_retaining)
    /// to observe which sources stayed unsatisfied.
    ///
    /// # Errors
    ///
    /// - [`ValidateError::DataIntegrity`] if the load recorded any diagnostic.
    /// - [`ValidateError::NoData`] if no source was loaded.
    /// - [`ValidateError::Validation`] on the first value `check` rejects.
    /// - [`ValidateError::Check`] if `check` fails with a fault.
    /// - [`ValidateError::NoMatch`] if `key` matched nothing.
    /// - [`ValidateError::RequiredSourcesUnsatisfied`] if a required source had no match.
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
        let mut remaining = required_sources.to_vec();
        self.validate_retaining(key, &mut remaining, check)
    }

    /// Like [`validate`](Self::validate), but removes each satisfied source from
    /// `required_sources` in place.
    ///
    /// After the call the vector holds exactly the required sources that never
    /// produced a match (up to the point an error stopped the scan). Reusing the
    /// same vector across calls accumulates those removals.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn validate_retaining<K, F>(
        &self,
        key: K,
        required_sources: &mut Vec<SourceId>,
        mut check: F,
    ) -> Result<(), ValidateError>
    where
        K: Into<KeySpec>,
        F: FnMut(&Value) -> Result<(), CheckFailure>,
    {
        self.pre_checks()?;
        let key = key.into();
        let mut found = false;

        for (source_id, document) in self.dataset.data() {
            for matched in key.matching_keys(document) {
                found = true;
                required_sources.retain(|id| id != source_id);

                let Some(value) = document.get(matched) else {
                    continue;
                };
                tracing::debug!(source = %source_id, key = matched, "checking value");
                check(value).map_err(|failure| match failure {
                    CheckFailure::Expectation(message) => ValidateError::Validation {
                        key: matched.to_owned(),
                        source_id: source_id.clone(),
                        message,
                    },
                    CheckFailure::Fault(error) => ValidateError::Check(error),
                })?;
            }
        }

        if !found {
            return Err(ValidateError::NoMatch {
                key: key.to_string(),
            });
        }
        if !required_sources.is_empty() {
            return Err(ValidateError::RequiredSourcesUnsatisfied {
                key: key.to_string(),
                missing: required_sources.clone(),
            });
        }
        Ok(())
    }

    fn pre_checks(&self) -> Result<(), ValidateError> {
        if !self.dataset.load_errors().is_empty() {
            return Err(ValidateError::DataIntegrity {
                errors: self.dataset.load_errors().to_vec(),
            });
        }
        if self.dataset.is_empty() {
            return Err(ValidateError::NoData);
        }
        Ok(())
    }
}
