//! File I/O: the CSV source, the JSON sink and transparent compression.

pub mod compression;
pub mod csv;
pub mod json;

pub use self::csv::{Dataset, LoadOptions, LoadStats, load, load_with, read_rows};
pub use self::json::{save, write_json_array};
