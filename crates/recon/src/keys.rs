//! Key extraction: splitting a header into the measure column and the key
//! column set.

/// Names (lowercase) that mark a column as the measure.
pub const MEASURE_NAMES: [&str; 2] = ["value", "values"];

/// True if `name` names a measure column, ignoring case.
pub fn is_measure_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    MEASURE_NAMES.contains(&lower.as_str())
}

/// Positions of the measure column and the key columns within a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// First column whose name is a measure name; later candidates stay keys.
    pub measure: Option<usize>,
    /// All other columns, in header order.
    pub keys: Vec<usize>,
}

impl ColumnLayout {
    pub fn classify<S: AsRef<str>>(columns: &[S]) -> Self {
        let measure = columns.iter().position(|c| is_measure_name(c.as_ref()));
        let keys = (0..columns.len()).filter(|&i| Some(i) != measure).collect();
        Self { measure, keys }
    }

    pub fn key_names<S: AsRef<str>>(&self, columns: &[S]) -> Vec<String> {
        self.keys.iter().map(|&i| columns[i].as_ref().to_string()).collect()
    }
}

/// Ordered key column names: every column except the measure column.
/// With no measure column, every column is a key.
pub fn key_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    ColumnLayout::classify(columns).key_names(columns)
}
