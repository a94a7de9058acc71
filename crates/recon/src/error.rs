use std::fmt;

/// Which input a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateKey {
    pub side: Side,
    /// Key tuple rendered as `a | b | c`.
    pub key: String,
    pub count: usize,
}

/// Structural problems that prevent key extraction or the join.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Dataset header has no columns at all.
    NoColumns { side: Side },
    /// Source and target key column sets have different lengths.
    KeyArityMismatch { source: Vec<String>, target: Vec<String> },
    /// The same join key appears on more than one row of a dataset.
    DuplicateKeys(Vec<DuplicateKey>),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoColumns { side } => write!(f, "{side} dataset has no columns"),
            Self::KeyArityMismatch { source, target } => write!(
                f,
                "key columns differ in number: source has {} ({}), target has {} ({})",
                source.len(),
                source.join(", "),
                target.len(),
                target.join(", "),
            ),
            Self::DuplicateKeys(dups) => {
                writeln!(f, "duplicate keys found:")?;
                for dup in dups {
                    writeln!(f, "  {} key {:?} appears {} times", dup.side, dup.key, dup.count)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug)]
pub enum ReconError {
    /// Input structure prevents reconciliation.
    Schema(SchemaError),
    /// Input cannot be parsed as delimited tabular data.
    Format { side: Option<Side>, message: String },
}

impl ReconError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format { side: None, message: message.into() }
    }

    /// Attach the input side to a format error raised while loading.
    pub fn on_side(self, side: Side) -> Self {
        match self {
            Self::Format { message, .. } => Self::Format { side: Some(side), message },
            other => other,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::Format { side: Some(side), message } => {
                write!(f, "{side} file is not valid delimited data: {message}")
            }
            Self::Format { side: None, message } => {
                write!(f, "not valid delimited data: {message}")
            }
        }
    }
}

impl std::error::Error for ReconError {}

impl From<SchemaError> for ReconError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}
