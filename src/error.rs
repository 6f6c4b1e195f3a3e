//! Error taxonomy for a conversion run.
//!
//! Every fatal failure carries the path it concerns and the [`Stage`] it
//! happened in, so the binary can report "which file, which stage" without
//! inspecting the variant itself.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Load,
    Save,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Config => "config",
            Stage::Load => "load",
            Stage::Save => "save",
            Stage::Report => "report",
        };
        f.write_str(s)
    }
}

/// Fatal conversion errors.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("load: cannot open input {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("load: {path:?} line {line}: expected {expected} fields, found {found}")]
    Malformed {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("load: {path:?} line {line}: invalid UTF-8")]
    Encoding { path: PathBuf, line: u64 },

    #[error("load: failed reading CSV from {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("save: cannot write output {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("save: cannot serialize rows to {path:?}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("report: cannot write run summary {path:?}")]
    Metrics {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ConvertError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            ConvertError::Config(_) => Stage::Config,
            ConvertError::Open { .. }
            | ConvertError::Malformed { .. }
            | ConvertError::Encoding { .. }
            | ConvertError::Csv { .. } => Stage::Load,
            ConvertError::Write { .. } | ConvertError::Serialize { .. } => Stage::Save,
            ConvertError::Metrics { .. } => Stage::Report,
        }
    }

    /// The file the failure concerns, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ConvertError::Config(_) => None,
            ConvertError::Open { path, .. }
            | ConvertError::Malformed { path, .. }
            | ConvertError::Encoding { path, .. }
            | ConvertError::Csv { path, .. }
            | ConvertError::Write { path, .. }
            | ConvertError::Serialize { path, .. }
            | ConvertError::Metrics { path, .. } => Some(path),
        }
    }
}
