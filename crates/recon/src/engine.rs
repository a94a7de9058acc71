use std::collections::HashMap;

use crate::dataset::Dataset;
use crate::error::{DuplicateKey, ReconError, SchemaError, Side};
use crate::keys::ColumnLayout;
use crate::model::{CombinedRow, JoinKey, ReconCounts, ReconResult};
use crate::value::Scalar;

/// Null-aware equality of two measure values.
///
/// Null matches null, null never matches a value, and values compare by
/// type-strict scalar equality.
pub fn values_match(source: &Scalar, target: &Scalar) -> bool {
    source == target
}

/// Outer-join `source` and `target` on their key columns and classify each
/// combined row as matched or mismatched.
pub fn reconcile(source: &Dataset, target: &Dataset) -> Result<ReconResult, ReconError> {
    if source.columns().is_empty() {
        return Err(SchemaError::NoColumns { side: Side::Source }.into());
    }
    if target.columns().is_empty() {
        return Err(SchemaError::NoColumns { side: Side::Target }.into());
    }

    let src_layout = ColumnLayout::classify(source.columns());
    let tgt_layout = ColumnLayout::classify(target.columns());
    if src_layout.keys.len() != tgt_layout.keys.len() {
        return Err(SchemaError::KeyArityMismatch {
            source: src_layout.key_names(source.columns()),
            target: tgt_layout.key_names(target.columns()),
        }
        .into());
    }

    let mut duplicates = Vec::new();
    let src = index_rows(source, &src_layout, Side::Source, &mut duplicates);
    let tgt = index_rows(target, &tgt_layout, Side::Target, &mut duplicates);
    if !duplicates.is_empty() {
        return Err(SchemaError::DuplicateKeys(duplicates).into());
    }

    let mut rows = Vec::with_capacity(src.order.len() + tgt.order.len());

    for key in &src.order {
        let value_source = src.values[key].clone();
        let (value_target, in_target) = match tgt.values.get(key) {
            Some(v) => (v.clone(), true),
            None => (Scalar::Null, false),
        };
        rows.push(combine(key, value_source, value_target, true, in_target));
    }

    for key in &tgt.order {
        if !src.values.contains_key(key) {
            let value_target = tgt.values[key].clone();
            rows.push(combine(key, Scalar::Null, value_target, false, true));
        }
    }

    let match_count = rows.iter().filter(|r| r.matched).count();
    let counts = ReconCounts {
        source_count: source.len(),
        target_count: target.len(),
        merged_count: rows.len(),
        match_count,
        mismatch_count: rows.len() - match_count,
        source_only_count: rows.iter().filter(|r| !r.in_target).count(),
        target_only_count: rows.iter().filter(|r| !r.in_source).count(),
    };

    Ok(ReconResult {
        key_columns: src_layout.key_names(source.columns()),
        source_measure: src_layout.measure.map(|m| source.columns()[m].clone()),
        target_measure: tgt_layout.measure.map(|m| target.columns()[m].clone()),
        record_count_equal: counts.source_count == counts.target_count,
        all_values_match: counts.mismatch_count == 0,
        counts,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct KeyIndex {
    /// Distinct keys in first-seen order.
    order: Vec<JoinKey>,
    values: HashMap<JoinKey, Scalar>,
}

fn index_rows(
    dataset: &Dataset,
    layout: &ColumnLayout,
    side: Side,
    duplicates: &mut Vec<DuplicateKey>,
) -> KeyIndex {
    let mut order = Vec::with_capacity(dataset.len());
    let mut values = HashMap::with_capacity(dataset.len());
    let mut counts: HashMap<JoinKey, usize> = HashMap::new();

    for row in dataset.rows() {
        let key = JoinKey(layout.keys.iter().map(|&i| row[i].clone()).collect());
        let count = counts.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            // No measure column: every value is null
            let value = layout.measure.map(|m| row[m].clone()).unwrap_or(Scalar::Null);
            order.push(key.clone());
            values.insert(key, value);
        }
    }

    for key in &order {
        let count = counts[key];
        if count > 1 {
            duplicates.push(DuplicateKey { side, key: key.to_string(), count });
        }
    }

    KeyIndex { order, values }
}

fn combine(
    key: &JoinKey,
    value_source: Scalar,
    value_target: Scalar,
    in_source: bool,
    in_target: bool,
) -> CombinedRow {
    let matched = values_match(&value_source, &value_target);
    CombinedRow {
        key: key.clone(),
        value_source,
        value_target,
        in_source,
        in_target,
        matched,
    }
}
