//! # dashdata
//!
//! Converts the hip fracture cohort CSV into the JSON array the dashboard
//! loads. The whole program is one linear pass:
//!
//! 1. [`load`](io::load) the CSV, keeping rows whose required fields
//!    (`age`, `sex`, `cogstat`, `uresidence` by default) are present and
//!    non-empty;
//! 2. [`save`](io::save) the retained rows as a pretty-printed JSON array of
//!    string-valued objects.
//!
//! Input order is preserved, values are never coerced, extra columns pass
//! through untouched.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dashdata::{load, save};
//!
//! # fn main() -> anyhow::Result<()> {
//! let rows = load("unsw_datathon_2025.csv")?;
//! println!("Loaded {} records", rows.len());
//! save(&rows, "data.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Malformed rows
//!
//! A data line with a different field count than the header is skipped with a
//! warning by default. Use [`Config::strict`] (or `--strict` on the command
//! line) to abort instead. See [`validation::RowErrorMode`].
//!
//! ## Module Overview
//!
//! - [`record`] - `Header` and `Row`, the order-preserving row mapping
//! - [`validation`] - the completeness predicate and malformed-row policy
//! - [`io`] - CSV loading, JSON saving, transparent compression
//! - [`config`] - resolved run configuration and defaults
//! - [`runner`] - the load/save driver
//! - [`metrics`] - row counters and stage timings
//! - [`error`] - the error taxonomy

pub mod config;
pub mod error;
pub mod io;
pub mod metrics;
pub mod record;
pub mod runner;
pub mod validation;

pub use config::Config;
pub use error::{ConvertError, Stage};
pub use io::{Dataset, LoadOptions, LoadStats, load, load_with, save};
pub use metrics::RunMetrics;
pub use record::{Header, Row};
pub use runner::{Progress, RunReport, run, run_with_progress};
pub use validation::{RequiredFields, RowErrorMode};
