use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::pipeline::CompareInputs;

// ---------------------------------------------------------------------------
// Job file
// ---------------------------------------------------------------------------

/// A saved comparison, read from TOML:
///
/// ```toml
/// source = "landing/sales.csv"
/// target = "warehouse/sales.csv"
/// output_dir = "recon"
/// summary = "recon/summary.csv"   # optional
/// delimiter = ";"                 # optional, default ","
/// ```
///
/// Relative paths resolve against the directory holding the job file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub source: PathBuf,
    pub target: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub summary: Option<PathBuf>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

#[derive(Debug)]
pub enum JobError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// Parsed, but a field value is unusable.
    Invalid(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "job file parse error: {msg}"),
            Self::Invalid(msg) => write!(f, "job file validation error: {msg}"),
        }
    }
}

impl std::error::Error for JobError {}

impl JobConfig {
    pub fn from_toml(input: &str) -> Result<Self, JobError> {
        let job: JobConfig = toml::from_str(input).map_err(|e| JobError::Parse(e.to_string()))?;
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<(), JobError> {
        for (field, path) in [
            ("source", &self.source),
            ("target", &self.target),
            ("output_dir", &self.output_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(JobError::Invalid(format!("{field} must not be empty")));
            }
        }
        delimiter_byte(self.delimiter).map_err(JobError::Invalid)?;
        Ok(())
    }

    /// Resolve paths against `base_dir` into runnable inputs.
    pub fn resolve(&self, base_dir: &Path) -> Result<CompareInputs, JobError> {
        let join = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { base_dir.join(p) };
        Ok(CompareInputs {
            source: join(&self.source),
            target: join(&self.target),
            output_dir: join(&self.output_dir),
            summary: self
                .summary
                .as_deref()
                .filter(|p| !p.as_os_str().is_empty())
                .map(join),
            delimiter: delimiter_byte(self.delimiter).map_err(JobError::Invalid)?,
        })
    }
}

/// Single-byte field delimiter, excluding characters that cannot delimit.
pub fn delimiter_byte(c: char) -> Result<u8, String> {
    if !c.is_ascii() {
        return Err(format!("delimiter must be a single ASCII character, got {c:?}"));
    }
    if matches!(c, '"' | '\n' | '\r') {
        return Err(format!("{c:?} cannot be used as a delimiter"));
    }
    Ok(c as u8)
}
