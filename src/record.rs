//! Row and header types.
//!
//! A [`Row`] is a string-to-string mapping whose key set comes from the input
//! header. Rows of one dataset share a single [`Header`] through an `Arc`, so a
//! row only owns its positional values.
//!
//! # Duplicate column names
//! A header may repeat a name. The repeated name becomes a single key that
//! keeps the position of its first occurrence and reads the value of its last
//! occurrence, the same outcome as inserting the columns into a dictionary
//! one by one.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Key {
    name: String,
    /// Column index the value is read from.
    column: usize,
}

/// Column names of a delimited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    width: usize,
    keys: Vec<Key>,
}

impl Header {
    /// Build a header from the raw column names, in file order.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut width = 0;
        let mut keys: Vec<Key> = Vec::new();
        for (column, name) in columns.into_iter().map(Into::into).enumerate() {
            width += 1;
            match keys.iter_mut().find(|k| k.name == name) {
                Some(existing) => existing.column = column,
                None => keys.push(Key { name, column }),
            }
        }
        Self { width, keys }
    }

    /// Number of columns every data line must have.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Distinct field names, in first-occurrence order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.name.as_str())
    }

    /// Column index holding the value for `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.keys.iter().find(|k| k.name == name).map(|k| k.column)
    }
}

/// One record: field name to field value, values kept as read.
#[derive(Clone)]
pub struct Row {
    header: Arc<Header>,
    values: Vec<String>,
}

impl Row {
    /// Pair `values` with `header`.
    ///
    /// Returns `None` when the value count differs from the header width.
    pub fn new(header: Arc<Header>, values: Vec<String>) -> Option<Self> {
        if values.len() != header.width() {
            return None;
        }
        Some(Self { header, values })
    }

    /// Value of field `name`, if the field exists.
    pub fn get(&self, name: &str) -> Option<&str> {
        let column = self.header.position(name)?;
        self.values.get(column).map(String::as_str)
    }

    /// `(field, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .keys
            .iter()
            .map(|k| (k.name.as_str(), self.values[k.column].as_str()))
    }

    /// Number of distinct fields.
    pub fn len(&self) -> usize {
        self.header.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.keys.is_empty()
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for Row {}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
