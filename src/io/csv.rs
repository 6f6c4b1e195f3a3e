//! Loading the cohort CSV.
//!
//! [`load`] reads a header-first, comma-delimited UTF-8 file into an ordered
//! `Vec<Row>`, keeping only rows that satisfy the completeness predicate.
//!
//! # Row handling
//! - A data line whose field count differs from the header is *malformed*.
//!   Under [`RowErrorMode::SkipInvalid`] it is dropped with a warning; under
//!   [`RowErrorMode::FailFast`] the load aborts with [`ConvertError::Malformed`].
//! - A well-formed row failing [`RequiredFields`] is *incomplete*. It is
//!   dropped silently (logged at `debug` only).
//! - Invalid UTF-8 anywhere aborts the load with [`ConvertError::Encoding`].
//!
//! Input order is preserved; nothing is sorted or deduplicated.

use crate::error::ConvertError;
use crate::io::compression::auto_detect_reader;
use crate::record::{Header, Row};
use crate::validation::{RequiredFields, RowErrorMode, format_errors};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Knobs for [`load_with`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub required: RequiredFields,
    pub on_malformed: RowErrorMode,
}

/// Per-load row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Data lines read (header excluded).
    pub rows_read: u64,
    pub retained: u64,
    /// Well-formed rows failing the completeness predicate.
    pub incomplete: u64,
    /// Lines skipped for a field count mismatch.
    pub malformed: u64,
}

/// The in-memory result of a load.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub rows: Vec<Row>,
    pub stats: LoadStats,
}

/// Load the retained rows of `path` with the default required fields and
/// malformed-row policy.
///
/// # Errors
/// See [`load_with`].
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Row>, ConvertError> {
    load_with(path, &LoadOptions::default()).map(|ds| ds.rows)
}

/// Load `path` into a [`Dataset`].
///
/// Compressed inputs (`.gz`, `.zst`, `.bz2`, `.xz`, or recognized by magic
/// bytes) are decompressed transparently. The file handle is released before
/// this function returns, on every path.
///
/// # Errors
/// - [`ConvertError::Open`] if the file is missing or unreadable.
/// - [`ConvertError::Malformed`] on a ragged line under [`RowErrorMode::FailFast`].
/// - [`ConvertError::Encoding`] on bytes that are not valid UTF-8.
/// - [`ConvertError::Csv`] for any other reader failure.
pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Dataset, ConvertError> {
    let path = path.as_ref();
    let open_err = |source| ConvertError::Open {
        path: path.to_path_buf(),
        source,
    };
    let f = File::open(path).map_err(open_err)?;
    let rdr = auto_detect_reader(f, path).map_err(open_err)?;
    read_rows(rdr, path, options)
}

/// Parse CSV from any reader. `path` is only used to label errors and logs.
pub fn read_rows<R: Read>(
    reader: R,
    path: &Path,
    options: &LoadOptions,
) -> Result<Dataset, ConvertError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = rdr.headers().map_err(|e| csv_error(path, e))?;
    let header = Arc::new(Header::new(header.iter()));
    for name in options.required.names() {
        if header.position(name).is_none() {
            warn!(
                field = %name,
                path = %path.display(),
                "required field is not a column; every row will be excluded"
            );
        }
    }

    let mut stats = LoadStats::default();
    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    while rdr
        .read_record(&mut record)
        .map_err(|e| csv_error(path, e))?
    {
        stats.rows_read += 1;
        let line = record.position().map_or(0, |p| p.line());
        let found = record.len();

        let Some(row) = Row::new(
            Arc::clone(&header),
            record.iter().map(str::to_owned).collect(),
        ) else {
            match options.on_malformed {
                RowErrorMode::FailFast => {
                    return Err(ConvertError::Malformed {
                        path: path.to_path_buf(),
                        line,
                        expected: header.width(),
                        found,
                    });
                }
                RowErrorMode::SkipInvalid => {
                    warn!(
                        line,
                        expected = header.width(),
                        found,
                        path = %path.display(),
                        "skipping malformed row"
                    );
                    stats.malformed += 1;
                    continue;
                }
            }
        };

        match options.required.check(&row) {
            Ok(()) => {
                stats.retained += 1;
                rows.push(row);
            }
            Err(errors) => {
                debug!(line, reasons = %format_errors(&errors), "row incomplete, excluded");
                stats.incomplete += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        read = stats.rows_read,
        retained = stats.retained,
        incomplete = stats.incomplete,
        malformed = stats.malformed,
        "loaded rows"
    );
    Ok(Dataset { rows, stats })
}

fn csv_error(path: &Path, err: csv::Error) -> ConvertError {
    if let csv::ErrorKind::Utf8 { pos, .. } = err.kind() {
        return ConvertError::Encoding {
            path: path.to_path_buf(),
            line: pos.as_ref().map_or(0, |p| p.line()),
        };
    }
    ConvertError::Csv {
        path: path.to_path_buf(),
        source: err,
    }
}
