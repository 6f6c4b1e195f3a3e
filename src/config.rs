//! Run configuration.
//!
//! Paths are always explicit: the library never reads a fixed location on its
//! own. The binary resolves flags and environment variables into a [`Config`]
//! and hands it to [`crate::runner::run`].

use crate::error::ConvertError;
use crate::io::LoadOptions;
use crate::validation::{RequiredFields, RowErrorMode};
use std::path::{Path, PathBuf};

// ============================================================================
// Defaults
// ============================================================================

/// Cohort extract location relative to the project root.
pub const DEFAULT_INPUT: &str = "01-Data-and-Data-Dictionary/unsw_datathon_2025.csv";

/// File the dashboard fetches.
pub const DEFAULT_OUTPUT: &str = "data.json";

/// Environment variable overriding the input path.
pub const ENV_INPUT: &str = "DASHDATA_INPUT";
/// Environment variable overriding the output path.
pub const ENV_OUTPUT: &str = "DASHDATA_OUTPUT";
/// Environment variable overriding the required field list.
pub const ENV_REQUIRE: &str = "DASHDATA_REQUIRE";
/// Environment variable enabling fail-fast on malformed rows.
pub const ENV_STRICT: &str = "DASHDATA_STRICT";

/// Everything a run needs, resolved before any file is touched.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub load: LoadOptions,
    /// Where to write the JSON run summary, if anywhere.
    pub metrics_path: Option<PathBuf>,
}

impl Config {
    /// Config with default required fields and the skip-and-warn policy.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            load: LoadOptions::default(),
            metrics_path: None,
        }
    }

    pub fn with_required(mut self, required: RequiredFields) -> Self {
        self.load.required = required;
        self
    }

    /// Abort on the first malformed row instead of skipping it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.load.on_malformed = if strict {
            RowErrorMode::FailFast
        } else {
            RowErrorMode::SkipInvalid
        };
        self
    }

    pub fn with_metrics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.load.required.is_empty() {
            return Err(ConvertError::Config(
                "at least one required field must be named".to_string(),
            ));
        }
        if same_path(&self.input, &self.output) {
            return Err(ConvertError::Config(format!(
                "input and output both point at {}",
                self.input.display()
            )));
        }
        if let Some(ref m) = self.metrics_path
            && (same_path(m, &self.output) || same_path(m, &self.input))
        {
            return Err(ConvertError::Config(format!(
                "metrics path {} collides with the input or output",
                m.display()
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT, DEFAULT_OUTPUT)
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
