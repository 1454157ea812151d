#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV street data cache.
//!
//! The street data file is both the input and the cache: each enrichment step
//! adds columns to it and writes it back, so later runs skip API calls whose
//! results are already on disk. The column set is open; [`Table`] keeps every
//! column it reads, including ones this workspace does not know about.

pub mod records;
pub mod table;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use ltn_distance_reconcile::ReconcileError;
use thiserror::Error;

pub use records::street_records;
pub use table::Table;

/// A column that must be present before a step can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredColumn {
    /// Header name.
    pub name: &'static str,
    /// Shown to the user when the column is missing.
    pub hint: &'static str,
}

pub const STREET_COLUMN: RequiredColumn = RequiredColumn {
    name: "street",
    hint: "required for graph label",
};

pub const POSTCODE_COLUMN: RequiredColumn = RequiredColumn {
    name: "postcode",
    hint: "run postcode lookup first",
};

pub const LATITUDE_COLUMN: RequiredColumn = RequiredColumn {
    name: "latitude",
    hint: "run coordinate lookup first",
};

pub const LONGITUDE_COLUMN: RequiredColumn = RequiredColumn {
    name: "longitude",
    hint: "run coordinate lookup first",
};

/// Errors from reading, writing, or interpreting the street data file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent.
    #[error("Column '{column}' not found in data ({hint})")]
    MissingColumn {
        /// Missing header name.
        column: String,
        /// What the user should do about it.
        hint: String,
    },

    /// A numeric cell could not be parsed.
    #[error("Row {row}: column '{column}' has non-numeric value '{value}'")]
    Parse {
        /// One-based data row number (header excluded).
        row: usize,
        /// Column the cell belongs to.
        column: String,
        /// Raw cell text.
        value: String,
    },

    /// A new column does not have one value per row.
    #[error("Column '{column}' has {actual} values but the table has {expected} rows")]
    ColumnLength {
        /// Column being set.
        column: String,
        /// Number of rows in the table.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// The rows do not form a valid dataset.
    #[error(transparent)]
    Dataset(#[from] ReconcileError),
}

/// The street data file on disk.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the whole file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be opened, or
    /// [`StoreError::Csv`] if it is not valid CSV.
    pub fn load(&self) -> Result<Table, StoreError> {
        let file = File::open(&self.path)?;
        let table = Table::from_reader(file)?;
        log::debug!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            table.headers().len(),
            self.path.display()
        );
        Ok(table)
    }

    /// Overwrites the file with `table`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Csv`] if writing fails.
    pub fn save(&self, table: &Table) -> Result<(), StoreError> {
        let file = File::create(&self.path)?;
        table.write_to(BufWriter::new(file))?;
        log::info!("Saved {} rows to {}", table.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ltn_distance_store_{}_{name}", std::process::id()))
    }

    #[test]
    fn save_then_load_keeps_unknown_columns() {
        let path = scratch_path("roundtrip.csv");
        let store = CsvStore::new(&path);

        let table =
            Table::from_reader("street,postcode,notes\nBeauchamp Lane,OX4 3LF,quiet\n".as_bytes())
                .unwrap();
        store.save(&table).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.headers(), ["street", "postcode", "notes"]);
        assert_eq!(loaded.column("notes").unwrap(), ["quiet"]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let store = CsvStore::new(scratch_path("does_not_exist.csv"));
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(StoreError::Io(_))));
    }

    #[test]
    fn missing_column_message_includes_hint() {
        let err = StoreError::MissingColumn {
            column: POSTCODE_COLUMN.name.to_string(),
            hint: POSTCODE_COLUMN.hint.to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Column 'postcode' not found in data (run postcode lookup first)"
        );
    }
}
