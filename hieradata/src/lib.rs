//! # hieradata
//!
//! Loader and key validator for hierarchical YAML configuration data.
//!
//! The crate keeps loading and validating apart:
//! - [`DocumentStore`] discovers documents under a root directory and parses
//!   them. A file that fails is recorded as a [`LoadError`] diagnostic and the
//!   load carries on.
//! - [`Validator`] applies a check to every value whose key matches a
//!   [`KeySpec`], across every loaded source, and refuses to run at all while
//!   load diagnostics exist.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hieradata::{DocumentStore, LoadOptions, SourceId, StoreConfig, ValueKind, check};
//!
//! let mut store = DocumentStore::new(StoreConfig::new("spec/fixtures/hieradata")).unwrap();
//! store.load(LoadOptions::default());
//!
//! // `host` must be a string everywhere, and `db.yaml` must define it.
//! store
//!     .validate("host", &[SourceId::from("db.yaml")], check::is_kind(ValueKind::String))
//!     .unwrap();
//!
//! // Every key starting with `apache::` must be non-empty.
//! let pattern = "/^apache::/".parse::<hieradata::KeySpec>().unwrap();
//! store.validate(pattern, &[], check::non_empty()).unwrap();
//! ```

pub mod check;
mod config;
mod error;
mod key;
pub mod output;
mod report;
pub mod rules;
mod source;
mod store;
mod validator;

pub use check::{CheckFailure, ValueKind};
pub use config::{DEFAULT_EXTENSIONS, LoadOptions, StoreConfig};
pub use error::{LoadError, LoadErrorKind, ValidateError};
pub use key::KeySpec;
pub use report::{RuleOutcome, RuleResult, ValidationReport};
pub use rules::{Expectation, Rule, RuleSet};
pub use source::SourceId;
pub use store::{Dataset, Document, DocumentStore};
pub use validator::Validator;
