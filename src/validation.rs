//! Row completeness and malformed-row handling.
//!
//! Two separate concerns live here:
//! - [`RequiredFields`] is the completeness predicate. A row failing it is not
//!   an error; it is simply left out of the output.
//! - [`RowErrorMode`] decides what happens to a data line whose field count
//!   does not match the header. Such a line never reaches the predicate.
//!
//! # Example
//!
//! ```
//! use dashdata::record::{Header, Row};
//! use dashdata::validation::RequiredFields;
//! use std::sync::Arc;
//!
//! let header = Arc::new(Header::new(["age", "sex", "cogstat", "uresidence"]));
//! let row = Row::new(header, vec!["".into(), "M".into(), "normal".into(), "home".into()]).unwrap();
//!
//! let required = RequiredFields::default();
//! let errors = required.check(&row).unwrap_err();
//! assert_eq!(errors[0].field.as_deref(), Some("age"));
//! ```

use crate::record::Row;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fields a cohort row must carry to be useful on the dashboard.
pub const DEFAULT_REQUIRED_FIELDS: [&str; 4] = ["age", "sex", "cogstat", "uresidence"];

/// Result type for validation operations.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The field that failed validation (optional)
    pub field: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn field<S: Into<String>, M: Into<String>>(field: S, message: M) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref field) = self.field {
            write!(f, "[{}] {}", field, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Join errors for a single log line.
pub fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// How to treat a data line whose field count differs from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowErrorMode {
    /// Drop the line, log a warning and keep going.
    #[default]
    SkipInvalid,
    /// Abort the whole load on the first such line.
    FailFast,
}

/// The completeness predicate: named fields that must be present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields {
    names: Vec<String>,
}

impl RequiredFields {
    /// Build a predicate over `names`. Duplicates are ignored.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !out.contains(&name) {
                out.push(name);
            }
        }
        Self { names: out }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check `row`, reporting every required field that is absent or empty.
    ///
    /// Values are not trimmed; `" "` counts as present.
    pub fn check(&self, row: &Row) -> ValidationResult {
        let mut errors = Vec::new();
        for name in &self.names {
            match row.get(name) {
                None => errors.push(ValidationError::field(name, "missing column")),
                Some(value) => {
                    if let Err(mut e) = validators::not_empty(name, value) {
                        errors.append(&mut e);
                    }
                }
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for RequiredFields {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_FIELDS)
    }
}

impl FromStr for RequiredFields {
    type Err = ValidationError;

    /// Parse a comma-separated field list such as `age,sex`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s.split(',').map(str::trim).collect();
        if names.iter().any(|n| n.is_empty()) {
            return Err(ValidationError::new(format!(
                "required field list '{}' contains an empty name",
                s
            )));
        }
        Ok(Self::new(names))
    }
}

/// Validation helpers for common patterns.
pub mod validators {
    use super::{ValidationError, ValidationResult};

    /// Validate that a string is not empty.
    pub fn not_empty(field: &str, value: &str) -> ValidationResult {
        if value.is_empty() {
            Err(vec![ValidationError::field(field, "must not be empty")])
        } else {
            Ok(())
        }
    }
}
