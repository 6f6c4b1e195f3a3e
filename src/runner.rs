//! The conversion driver: load, report, save, report.
//!
//! [`run`] is the whole program minus argument parsing. It validates the
//! config, loads the retained rows, writes them, and optionally writes a run
//! summary. Load always finishes before the output is opened, so a load
//! failure leaves any existing output untouched.

use crate::config::Config;
use crate::error::ConvertError;
use crate::io::{load_with, save};
use crate::metrics::RunMetrics;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span};

/// Stage boundaries surfaced to the caller for console reporting.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Loading(&'a Path),
    Loaded { retained: usize },
    Saving(&'a Path),
    Saved { rows: usize, path: &'a Path },
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Rows written to the output artifact.
    pub rows: usize,
    /// Absolute path of the output artifact.
    pub output: PathBuf,
    pub metrics: RunMetrics,
}

/// Run a conversion without progress reporting.
pub fn run(config: &Config) -> Result<RunReport, ConvertError> {
    run_with_progress(config, |_| {})
}

/// Run a conversion, calling `on_progress` at each stage boundary.
///
/// # Errors
/// Any [`ConvertError`]; its [`stage`](ConvertError::stage) tells whether the
/// configuration, load, save or summary step failed.
pub fn run_with_progress<F>(config: &Config, mut on_progress: F) -> Result<RunReport, ConvertError>
where
    F: FnMut(Progress<'_>),
{
    config.validate()?;
    let _span = info_span!("convert", input = %config.input.display()).entered();
    let mut metrics = RunMetrics::new();

    on_progress(Progress::Loading(&config.input));
    let started = Instant::now();
    let dataset = load_with(&config.input, &config.load)?;
    metrics.record_load(&dataset.stats, started.elapsed());
    on_progress(Progress::Loaded {
        retained: dataset.rows.len(),
    });

    on_progress(Progress::Saving(&config.output));
    let started = Instant::now();
    let rows = save(&dataset.rows, &config.output)?;
    metrics.record_save(rows, started.elapsed());

    let output = std::path::absolute(&config.output).unwrap_or_else(|_| config.output.clone());
    on_progress(Progress::Saved {
        rows,
        path: &output,
    });

    if let Some(ref path) = config.metrics_path {
        metrics
            .save_to_file(path)
            .map_err(|source| ConvertError::Metrics {
                path: path.clone(),
                source: source.into(),
            })?;
        info!(path = %path.display(), "wrote run summary");
    }

    info!(
        rows,
        excluded = metrics.rows_excluded(),
        output = %output.display(),
        "conversion complete"
    );
    Ok(RunReport {
        rows,
        output,
        metrics,
    })
}
