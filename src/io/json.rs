//! Writing the dashboard JSON array.

use crate::error::ConvertError;
use crate::io::compression::auto_detect_writer;
use crate::record::Row;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Serialize `rows` to `writer` as one pretty-printed JSON array (2-space indent).
///
/// Each row becomes an object with string values in header order. An empty
/// slice produces `[]`.
pub fn write_json_array<W: Write>(writer: W, rows: &[Row]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, rows)
}

/// Write `rows` to `path`, replacing any existing file.
///
/// The parent directory must already exist. Output is compressed when the
/// extension names a codec (e.g. `data.json.gz`).
///
/// # Returns
/// The number of rows written (`rows.len()`).
///
/// # Errors
/// [`ConvertError::Write`] naming `path` if the file cannot be created, written
/// or flushed; [`ConvertError::Serialize`] if a row cannot be encoded.
pub fn save(rows: &[Row], path: impl AsRef<Path>) -> Result<usize, ConvertError> {
    let path = path.as_ref();
    let write_err = |source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };

    let f = File::create(path).map_err(write_err)?;
    let mut w = auto_detect_writer(f, path).map_err(write_err)?;
    write_json_array(&mut w, rows).map_err(|e| {
        if e.is_io() {
            write_err(e.into())
        } else {
            ConvertError::Serialize {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    w.write_all(b"\n").map_err(write_err)?;
    w.finish().map_err(write_err)?;

    info!(rows = rows.len(), path = %path.display(), "wrote JSON array");
    Ok(rows.len())
}
