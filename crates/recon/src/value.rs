use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};

/// Cell contents that read as a missing value.
pub const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw)
}

/// Bounds of the integral floats that convert to `i64` without loss.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// A single nullable cell value.
///
/// Equality is null-aware and type-strict: `Null == Null`, numbers compare
/// numerically, text compares literally, and a number never equals text.
///
/// Numbers are kept in canonical form: any integral value in `i64` range is
/// an `Int`, so `Number` never holds a value an `Int` could. That keeps the
/// derived `Eq`/`Hash` numeric (`10` == `10.0`) while integers beyond 2^53
/// stay exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Null,
    Int(i64),
    /// Non-integral, or integral outside `i64` range.
    Number(OrderedFloat<f64>),
    Text(String),
}

impl Scalar {
    pub fn int(v: i64) -> Self {
        Scalar::Int(v)
    }

    pub fn number(v: f64) -> Self {
        if v.is_nan() {
            return Scalar::Null;
        }
        // Also folds -0.0 into Int(0)
        if v.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&v) {
            return Scalar::Int(v as i64);
        }
        Scalar::Number(OrderedFloat(v))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Scalar::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Convert a raw cell from a column of the given kind.
    pub fn from_cell(raw: &str, kind: ColumnKind) -> Self {
        if is_null_token(raw) {
            return Scalar::Null;
        }
        match kind {
            ColumnKind::Numeric => parse_numeric(raw).unwrap_or(Scalar::Null),
            ColumnKind::Text => Scalar::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Number(n) => write!(f, "{}", n.0),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Number(n) => serializer.serialize_f64(n.0),
            Scalar::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Inferred type of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// A column is numeric when every non-null cell parses as a number.
/// An all-null column counts as numeric.
pub fn infer_column_kind<'a>(cells: impl IntoIterator<Item = &'a str>) -> ColumnKind {
    let all_numeric = cells
        .into_iter()
        .filter(|c| !is_null_token(c))
        .all(|c| parse_numeric(c).is_some());
    if all_numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

/// Parse a numeric cell. Plain integers are read exactly; anything else
/// goes through `f64`.
pub fn parse_numeric(raw: &str) -> Option<Scalar> {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Scalar::Int(i));
    }
    parse_number(trimmed).map(Scalar::number)
}

/// Parse a plain decimal / scientific number, ignoring surrounding whitespace.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: f64 = trimmed.parse().ok()?;
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}
