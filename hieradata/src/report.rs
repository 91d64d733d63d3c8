//! Validation report types.

use serde::Serialize;

use crate::error::LoadError;
use crate::source::SourceId;
use crate::store::Dataset;

/// Outcome of one rule.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum RuleOutcome {
    Passed,
    Failed(String),
    /// Not evaluated because the data failed to load.
    Skipped,
}

/// A rule and its outcome.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct RuleResult {
    /// The rule's key specifier, in text form.
    pub key: String,
    /// Sources the rule required a match in.
    pub required_sources: Vec<SourceId>,
    pub outcome: RuleOutcome,
}

/// Result of loading a hieradata tree and running rules over it.
///
/// A non-empty `load_errors` means the data could not be trusted and no rule
/// was evaluated; treat it as a failure regardless of `rule_results`.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ValidationReport {
    /// Number of sources loaded into the dataset.
    pub sources_loaded: usize,
    /// Whether the data loaded cleanly AND every rule passed.
    pub ok: bool,
    /// Load diagnostics: files that could not be read, parsed, or were empty.
    pub load_errors: Vec<LoadError>,
    /// One entry per rule, in rule order.
    pub rule_results: Vec<RuleResult>,
}

impl ValidationReport {
    /// Report of a load alone, with no rules.
    #[must_use]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            sources_loaded: dataset.len(),
            ok: dataset.load_errors().is_empty(),
            load_errors: dataset.load_errors().to_vec(),
            rule_results: Vec::new(),
        }
    }

    /// Number of rules that did not pass (failed or skipped).
    #[must_use]
    pub fn failed_rules(&self) -> usize {
        self.rule_results
            .iter()
            .filter(|r| r.outcome != RuleOutcome::Passed)
            .count()
    }

    #[must_use]
    pub fn passed_rules(&self) -> usize {
        self.rule_results.len() - self.failed_rules()
    }
}
