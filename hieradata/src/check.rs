//! Value checks.
//!
//! A check takes one decoded value and returns `Ok(())` when it is acceptable.
//! It reports a rejected value with [`CheckFailure::Expectation`]; the validator
//! turns that into a [`ValidateError::Validation`](crate::ValidateError::Validation)
//! naming the key and source. Any other failure is a
//! [`CheckFailure::Fault`] and is passed through untouched.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Why a check rejected a value.
#[derive(Debug)]
pub enum CheckFailure {
    /// The value did not meet the check's expectation.
    Expectation(String),
    /// The check itself failed (a bug or an environmental error).
    Fault(anyhow::Error),
}

impl CheckFailure {
    #[must_use]
    pub fn expectation(message: impl Into<String>) -> Self {
        Self::Expectation(message.into())
    }

    #[must_use]
    pub fn fault(error: impl Into<anyhow::Error>) -> Self {
        Self::Fault(error.into())
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expectation(message) => f.write_str(message),
            Self::Fault(error) => write!(f, "{error}"),
        }
    }
}

/// Lets `?` inside a check turn ordinary errors into faults.
impl<E> From<E> for CheckFailure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::Fault(error.into())
    }
}

/// Fail with an expectation unless `condition` holds.
///
/// # Errors
///
/// Returns [`CheckFailure::Expectation`] built from `message` when `condition` is false.
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), CheckFailure> {
    if condition {
        Ok(())
    } else {
        Err(CheckFailure::Expectation(message()))
    }
}

/// The shape of a decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ValueKind {
    String,
    Number,
    Integer,
    #[serde(alias = "boolean")]
    Bool,
    #[serde(alias = "sequence", alias = "list")]
    Array,
    #[serde(alias = "hash", alias = "map")]
    Mapping,
    Null,
}

impl ValueKind {
    /// Whether `value` has this shape. `Integer` values are also `Number`s.
    #[must_use]
    pub fn admits(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Mapping => value.is_object(),
            Self::Null => value.is_null(),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Array => "array",
            Self::Mapping => "mapping",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "bool" | "boolean" => Ok(Self::Bool),
            "array" | "sequence" | "list" => Ok(Self::Array),
            "mapping" | "hash" | "map" => Ok(Self::Mapping),
            "null" => Ok(Self::Null),
            other => Err(format!("unknown value kind '{other}'")),
        }
    }
}

fn describe(value: &Value) -> String {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    };
    format!("{kind} {value}")
}

/// Accepts values of the given shape.
pub fn is_kind(kind: ValueKind) -> impl Fn(&Value) -> Result<(), CheckFailure> + Clone {
    move |value| ensure(kind.admits(value), || format!("expected {kind}, got {}", describe(value)))
}

/// Accepts values equal to `expected`.
pub fn equals(expected: Value) -> impl Fn(&Value) -> Result<(), CheckFailure> + Clone {
    move |value| ensure(*value == expected, || format!("expected {expected}, got {value}"))
}

/// Accepts strings in which `pattern` finds a match.
pub fn matches(pattern: Regex) -> impl Fn(&Value) -> Result<(), CheckFailure> + Clone {
    move |value| {
        let ok = value.as_str().is_some_and(|s| pattern.is_match(s));
        ensure(ok, || {
            format!(
                "expected a string matching /{}/, got {}",
                pattern.as_str(),
                describe(value)
            )
        })
    }
}

/// Accepts values equal to one of `allowed`.
pub fn one_of(allowed: Vec<Value>) -> impl Fn(&Value) -> Result<(), CheckFailure> + Clone {
    move |value| {
        ensure(allowed.contains(value), || {
            format!("expected one of {}, got {value}", Value::Array(allowed.clone()))
        })
    }
}

/// Rejects `null`, empty strings, empty sequences and empty mappings.
pub fn non_empty() -> impl Fn(&Value) -> Result<(), CheckFailure> + Clone {
    |value| {
        let empty = match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        };
        ensure(!empty, || format!("expected a non-empty value, got {}", describe(value)))
    }
}
