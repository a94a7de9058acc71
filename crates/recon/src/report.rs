// Report assembly: reconciliation result in, three tables out.
// Pure rendering; writing the tables is the caller's job.

use std::io;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{CombinedRow, ReconResult};

pub const VALUE_SOURCE_COLUMN: &str = "value_source";
pub const VALUE_TARGET_COLUMN: &str = "value_target";

/// Summary columns, in output order.
pub const SUMMARY_COLUMNS: [&str; 13] = [
    "Source File Name",
    "Target File Name",
    "Date & Time",
    "Source File Directory & Path",
    "Target File Directory & Path",
    "No. of records in Source File",
    "No. of records in Target File",
    "No. of Match records",
    "No. of Mismatch records",
    "Dataset Match Flag",
    "Location of Match records",
    "Location of Mismatch records",
    "Remarks",
];

/// Format of the `Date & Time` summary field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as delimited text: header row, then one record per row.
    pub fn to_csv_bytes(&self, delimiter: u8) -> io::Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.into_inner().map_err(|e| e.into_error())
    }
}

// ---------------------------------------------------------------------------
// Summary metadata supplied by the caller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SummaryInfo {
    /// File identifiers (file names without extension).
    pub source_name: String,
    pub target_name: String,
    pub timestamp: NaiveDateTime,
    pub source_path: String,
    pub target_path: String,
    pub match_path: String,
    pub mismatch_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Present only when at least one row matched.
    pub matched: Option<Table>,
    /// Present only when at least one row mismatched.
    pub mismatched: Option<Table>,
    pub summary: Table,
}

pub fn assemble(result: &ReconResult, info: &SummaryInfo) -> Report {
    let matched = if result.counts.match_count > 0 {
        Some(rows_table(&result.key_columns, result.matched_rows()))
    } else {
        None
    };
    let mismatched = if result.counts.mismatch_count > 0 {
        Some(rows_table(&result.key_columns, result.mismatched_rows()))
    } else {
        None
    };

    Report {
        matched,
        mismatched,
        summary: summary_table(result, info),
    }
}

fn rows_table<'a>(key_columns: &[String], rows: impl Iterator<Item = &'a CombinedRow>) -> Table {
    let mut headers = key_columns.to_vec();
    headers.push(VALUE_SOURCE_COLUMN.to_string());
    headers.push(VALUE_TARGET_COLUMN.to_string());

    let rows = rows
        .map(|row| {
            let mut cells: Vec<String> = row.key.0.iter().map(|k| k.to_string()).collect();
            cells.push(row.value_source.to_string());
            cells.push(row.value_target.to_string());
            cells
        })
        .collect();

    Table { headers, rows }
}

fn summary_table(result: &ReconResult, info: &SummaryInfo) -> Table {
    let c = &result.counts;
    let row = vec![
        info.source_name.clone(),
        info.target_name.clone(),
        info.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        info.source_path.clone(),
        info.target_path.clone(),
        c.source_count.to_string(),
        c.target_count.to_string(),
        c.match_count.to_string(),
        c.mismatch_count.to_string(),
        if result.all_values_match { "1" } else { "0" }.to_string(),
        info.match_path.clone(),
        info.mismatch_path.clone(),
        String::new(),
    ];

    Table {
        headers: SUMMARY_COLUMNS.iter().map(|h| h.to_string()).collect(),
        rows: vec![row],
    }
}
