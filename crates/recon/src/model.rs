use std::fmt;

use serde::Serialize;

use crate::value::Scalar;

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// Tuple of key-column values identifying a row in both datasets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JoinKey(pub Vec<Scalar>);

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// One row of the outer join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRow {
    pub key: JoinKey,
    /// Null when the key is absent from the source.
    pub value_source: Scalar,
    /// Null when the key is absent from the target.
    pub value_target: Scalar,
    pub in_source: bool,
    pub in_target: bool,
    pub matched: bool,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconCounts {
    pub source_count: usize,
    pub target_count: usize,
    pub merged_count: usize,
    pub match_count: usize,
    pub mismatch_count: usize,
    pub source_only_count: usize,
    pub target_only_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconResult {
    /// Key column names as named in the source header.
    pub key_columns: Vec<String>,
    pub source_measure: Option<String>,
    pub target_measure: Option<String>,
    pub counts: ReconCounts,
    pub record_count_equal: bool,
    pub all_values_match: bool,
    /// Source keys in source order, then target-only keys in target order.
    pub rows: Vec<CombinedRow>,
}

impl ReconResult {
    pub fn matched_rows(&self) -> impl Iterator<Item = &CombinedRow> {
        self.rows.iter().filter(|r| r.matched)
    }

    pub fn mismatched_rows(&self) -> impl Iterator<Item = &CombinedRow> {
        self.rows.iter().filter(|r| !r.matched)
    }

    /// Both record counts and every value agree.
    pub fn is_reconciled(&self) -> bool {
        self.record_count_equal && self.all_values_match
    }
}
