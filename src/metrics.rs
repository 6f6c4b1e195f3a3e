//! Run metrics: row counts and stage timings for one conversion.
//!
//! [`RunMetrics`] is filled in by the runner. It can be printed to stdout or
//! saved as a pretty-printed JSON summary next to the output artifact.
//!
//! # Example
//!
//! ```no_run
//! use dashdata::config::Config;
//! use dashdata::runner::run;
//!
//! # fn main() -> anyhow::Result<()> {
//! let report = run(&Config::new("cohort.csv", "data.json"))?;
//! report.metrics.print();
//! report.metrics.save_to_file("run-summary.json")?;
//! # Ok(())
//! # }
//! ```

use crate::io::LoadStats;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunMetrics {
    pub rows_read: u64,
    pub rows_retained: u64,
    pub rows_incomplete: u64,
    pub rows_malformed: u64,
    pub rows_written: u64,
    pub load_ms: u64,
    pub save_ms: u64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of the load stage.
    pub fn record_load(&mut self, stats: &LoadStats, elapsed: Duration) {
        self.rows_read = stats.rows_read;
        self.rows_retained = stats.retained;
        self.rows_incomplete = stats.incomplete;
        self.rows_malformed = stats.malformed;
        self.load_ms = millis(elapsed);
    }

    /// Record the outcome of the save stage.
    pub fn record_save(&mut self, written: usize, elapsed: Duration) {
        self.rows_written = written as u64;
        self.save_ms = millis(elapsed);
    }

    /// Rows dropped for any reason.
    pub fn rows_excluded(&self) -> u64 {
        self.rows_incomplete + self.rows_malformed
    }

    pub fn print(&self) {
        println!("\n========== Run Metrics ==========");
        println!("Rows read:        {}", self.rows_read);
        println!("Rows retained:    {}", self.rows_retained);
        println!("Rows incomplete:  {}", self.rows_incomplete);
        println!("Rows malformed:   {}", self.rows_malformed);
        println!("Rows written:     {}", self.rows_written);
        println!("---------------------------------");
        println!("Load: {} ms, save: {} ms", self.load_ms, self.save_ms);
        println!("=================================\n");
    }

    /// Save the metrics as pretty-printed JSON, replacing any existing file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(self).context("serialize run metrics")?;
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
