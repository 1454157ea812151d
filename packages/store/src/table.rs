//! In-memory CSV table with string cells.

use std::io::{Read, Write};

use crate::{RequiredColumn, StoreError};

/// Header row plus data rows. Every row has exactly one cell per header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parses CSV with a header row. Short rows are padded with empty cells;
    /// cells beyond the header are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] if the input is not valid CSV.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row = (0..headers.len())
                .map(|i| record.get(i).unwrap_or("").trim().to_owned())
                .collect();
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Writes the table as CSV, header first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] if writing fails.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Whether every one of `names` is present.
    #[must_use]
    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has_column(name))
    }

    /// Cells of column `name`, one per row.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.index_of(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Cells of a required column.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingColumn`] carrying the column's hint.
    pub fn require_column(&self, column: RequiredColumn) -> Result<Vec<&str>, StoreError> {
        self.column(column.name)
            .ok_or_else(|| StoreError::MissingColumn {
                column: column.name.to_string(),
                hint: column.hint.to_string(),
            })
    }

    /// Parses column `name` as meters or degrees. Empty cells are `None`.
    ///
    /// # Errors
    ///
    /// * [`StoreError::MissingColumn`] if the column is absent.
    /// * [`StoreError::Parse`] if a non-empty cell is not a number.
    pub fn f64_column(&self, name: &str) -> Result<Vec<Option<f64>>, StoreError> {
        let cells = self.column(name).ok_or_else(|| StoreError::MissingColumn {
            column: name.to_string(),
            hint: "expected a numeric column".to_string(),
        })?;

        cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| parse_cell(cell, i + 1, name))
            .collect()
    }

    /// Adds column `name` at the end, or replaces it in place if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ColumnLength`] unless there is one value per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), StoreError> {
        if values.len() != self.rows.len() {
            return Err(StoreError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        if let Some(idx) = self.index_of(name) {
            for (row, value) in self.rows.iter_mut().zip(values) {
                row[idx] = value;
            }
        } else {
            self.headers.push(name.to_string());
            for (row, value) in self.rows.iter_mut().zip(values) {
                row.push(value);
            }
        }

        Ok(())
    }

    /// [`Self::set_column`] for numbers; `None` becomes an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ColumnLength`] unless there is one value per row.
    pub fn set_f64_column(&mut self, name: &str, values: &[Option<f64>]) -> Result<(), StoreError> {
        let cells = values
            .iter()
            .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
            .collect();
        self.set_column(name, cells)
    }
}

fn parse_cell(cell: &str, row: usize, column: &str) -> Result<Option<f64>, StoreError> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| StoreError::Parse {
            row,
            column: column.to_string(),
            value: cell.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{POSTCODE_COLUMN, STREET_COLUMN};

    const SAMPLE: &str = "\
street,postcode,latitude,longitude
Beauchamp Lane,OX4 3LF,51.7229,-1.2136
Cavell Road, OX4 4AP ,,
";

    fn sample() -> Table {
        Table::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn reads_headers_and_trims_cells() {
        let table = sample();
        assert_eq!(table.headers(), ["street", "postcode", "latitude", "longitude"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("postcode").unwrap(), ["OX4 3LF", "OX4 4AP"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = Table::from_reader("street,postcode\nIffley Turn\n".as_bytes()).unwrap();
        assert_eq!(table.column("postcode").unwrap(), [""]);
    }

    #[test]
    fn has_columns_requires_all() {
        let table = sample();
        assert!(table.has_columns(&["latitude", "longitude"]));
        assert!(!table.has_columns(&["latitude", "driving_distance_to_templars_before"]));
    }

    #[test]
    fn require_column_reports_hint() {
        let table = Table::from_reader("street\nCavell Road\n".as_bytes()).unwrap();
        assert!(table.require_column(STREET_COLUMN).is_ok());

        let err = table.require_column(POSTCODE_COLUMN).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingColumn { column, hint }
                if column == "postcode" && hint == "run postcode lookup first"
        ));
    }

    #[test]
    fn empty_numeric_cells_are_none() {
        let table = sample();
        assert_eq!(
            table.f64_column("latitude").unwrap(),
            vec![Some(51.7229), None]
        );
    }

    #[test]
    fn bad_number_reports_row_and_column() {
        let table = Table::from_reader("street,latitude\nA,51.7\nB,north\n".as_bytes()).unwrap();
        let err = table.f64_column("latitude").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Parse { row: 2, column, value } if column == "latitude" && value == "north"
        ));
    }

    #[test]
    fn set_column_appends_then_replaces() {
        let mut table = sample();
        table
            .set_f64_column("driving_distance_to_templars_meters", &[Some(1200.5), None])
            .unwrap();
        assert_eq!(
            table.column("driving_distance_to_templars_meters").unwrap(),
            ["1200.5", ""]
        );

        table
            .set_column(
                "driving_distance_to_templars_meters",
                vec!["0".to_string(), "10".to_string()],
            )
            .unwrap();
        assert_eq!(table.headers().len(), 5);
        assert_eq!(
            table.f64_column("driving_distance_to_templars_meters").unwrap(),
            vec![Some(0.0), Some(10.0)]
        );
    }

    #[test]
    fn set_column_rejects_wrong_length() {
        let mut table = sample();
        let err = table.set_column("extra", vec![String::new()]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ColumnLength { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn write_round_trips_quoted_cells() {
        let mut table = Table::from_reader("street\n\"St Mary's, Court\"\n".as_bytes()).unwrap();
        table.set_column("postcode", vec!["OX4 4UX".to_string()]).unwrap();

        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "street,postcode\n\"St Mary's, Court\",OX4 4UX\n");
    }
}
