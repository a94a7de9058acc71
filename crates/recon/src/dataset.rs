use std::io::Read;

use crate::error::ReconError;
use crate::value::{infer_column_kind, ColumnKind, Scalar};

/// An in-memory table: ordered column names plus rows of nullable cells.
///
/// Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self, ReconError> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(ReconError::format(format!(
                "row {} has {} fields, header has {}",
                i + 1,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Parse delimited text whose first record is the header row.
    pub fn from_csv_str(data: &str, delimiter: u8) -> Result<Self, ReconError> {
        Self::from_reader(data.as_bytes(), delimiter)
    }

    /// Parse delimited data from any reader. Column types are inferred per
    /// column: numeric if every non-null cell is a number, text otherwise.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| ReconError::format(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut raw: Vec<csv::StringRecord> = Vec::new();
        for record in reader.records() {
            raw.push(record.map_err(|e| ReconError::format(e.to_string()))?);
        }

        let kinds: Vec<ColumnKind> = (0..columns.len())
            .map(|c| infer_column_kind(raw.iter().map(|r| r.get(c).unwrap_or(""))))
            .collect();

        let rows = raw
            .iter()
            .map(|record| {
                kinds
                    .iter()
                    .enumerate()
                    .map(|(c, kind)| Scalar::from_cell(record.get(c).unwrap_or(""), *kind))
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Scalar> {
        let c = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(c))
    }
}
