//! Declarative rule files.
//!
//! A rule file is a YAML document listing keys to validate:
//!
//! ```yaml
//! rules:
//!   - key: ntp::servers
//!     required_sources: [common.yaml]
//!     expect:
//!       - type: array
//!       - non_empty: true
//!   - key: /^apache::/
//!     expect:
//!       - matches: '^[a-z0-9_.-]+$'
//! ```
//!
//! `key` uses the [`KeySpec`] text form: `/regex/` for a pattern, anything else
//! for an exact key. Exact keys that begin with `/` need an anchored pattern.
//! Every rule runs, so one failure does not hide the rest.

use std::path::Path;

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::check::{self, CheckFailure, ValueKind};
use crate::key::KeySpec;
use crate::report::{RuleOutcome, RuleResult, ValidationReport};
use crate::source::SourceId;
use crate::store::Dataset;

/// A declarative check on a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The value has this shape.
    Type(ValueKind),
    /// The value equals this one.
    Equals(Value),
    /// The value is a string this regex finds a match in.
    Matches(String),
    /// The value equals one of these.
    OneOf(Vec<Value>),
    /// When `true`, the value is not null and not an empty string, sequence or mapping.
    NonEmpty(bool),
}

type BoxedCheck = Box<dyn Fn(&Value) -> Result<(), CheckFailure> + Send + Sync>;

impl Expectation {
    fn compile(&self) -> anyhow::Result<BoxedCheck> {
        let compiled: BoxedCheck = match self {
            Self::Type(kind) => Box::new(check::is_kind(*kind)),
            Self::Equals(expected) => Box::new(check::equals(expected.clone())),
            Self::Matches(pattern) => {
                let re = Regex::new(pattern)
                    .with_context(|| format!("invalid 'matches' pattern '{pattern}'"))?;
                Box::new(check::matches(re))
            }
            Self::OneOf(allowed) => Box::new(check::one_of(allowed.clone())),
            Self::NonEmpty(true) => Box::new(check::non_empty()),
            Self::NonEmpty(false) => Box::new(|_: &Value| Ok::<(), CheckFailure>(())),
        };
        Ok(compiled)
    }
}

/// One key to validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Key specifier in text form: `/regex/` or an exact key.
    ///
    /// An exact key beginning with `/` cannot be written here; use an anchored
    /// pattern such as `/^[/]etc[/]hosts$/`.
    pub key: String,
    /// Sources that must each hold a match.
    #[serde(default)]
    pub required_sources: Vec<SourceId>,
    /// Checks applied, in order, to every matched value.
    #[serde(default)]
    pub expect: Vec<Expectation>,
}

impl Rule {
    /// Validate this rule against `dataset`.
    fn evaluate(&self, dataset: &Dataset) -> anyhow::Result<RuleOutcome> {
        let key: KeySpec = self
            .key
            .parse()
            .with_context(|| format!("invalid key '{}'", self.key))?;
        let checks = self
            .expect
            .iter()
            .map(Expectation::compile)
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("invalid expectation for key '{}'", self.key))?;

        let result = dataset
            .validator()
            .validate(key, &self.required_sources, |value: &Value| {
                checks.iter().try_for_each(|check| check(value))
            });
        Ok(match result {
            Ok(()) => RuleOutcome::Passed,
            Err(e) => RuleOutcome::Failed(e.to_string()),
        })
    }
}

/// A list of rules, usually read from a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Parse a rule file's content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid rule document.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        serde_saphyr::from_str(content).context("failed to parse rule file")
    }

    /// Read and parse a rule file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid rule document.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read rule file {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Run every rule against `dataset`.
    ///
    /// When the dataset carries load diagnostics no rule is evaluated: each is
    /// reported as skipped and the diagnostics are listed in the report.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule is malformed (bad key pattern or bad regex).
    pub fn run(&self, dataset: &Dataset) -> anyhow::Result<ValidationReport> {
        let load_failed = !dataset.load_errors().is_empty();
        let mut rule_results = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let outcome = if load_failed {
                RuleOutcome::Skipped
            } else {
                rule.evaluate(dataset)?
            };
            if let RuleOutcome::Failed(message) = &outcome {
                tracing::info!(key = %rule.key, "rule failed: {message}");
            }
            rule_results.push(RuleResult {
                key: rule.key.clone(),
                required_sources: rule.required_sources.clone(),
                outcome,
            });
        }

        let mut report = ValidationReport::from_dataset(dataset);
        report.rule_results = rule_results;
        report.ok = report.load_errors.is_empty()
            && report
                .rule_results
                .iter()
                .all(|r| r.outcome == RuleOutcome::Passed);
        Ok(report)
    }
}
