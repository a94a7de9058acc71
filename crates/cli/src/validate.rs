// Input checks run before any file is loaded.

use std::fmt;
use std::path::{Path, PathBuf};

use tabrecon_recon::Side;

use crate::paths::OutputPaths;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input path does not name an existing file.
    NotFound { side: Side, path: PathBuf },
    /// Input file does not end in `.csv` (any case).
    NotCsv { side: Side, path: PathBuf },
    /// Source and target are the same file.
    SameFile { path: PathBuf },
    /// Output directory does not exist.
    OutputDirMissing { path: PathBuf },
    /// An output path names one of the input files.
    OverwritesInput { side: Side, path: PathBuf },
    /// Two outputs of the same run share a path.
    OutputCollision { path: PathBuf },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { side, path } => {
                write!(f, "{side} file does not exist: {}", path.display())
            }
            Self::NotCsv { side, path } => {
                write!(f, "{side} file is not a .csv file: {}", path.display())
            }
            Self::SameFile { path } => {
                write!(f, "source and target are the same file: {}", path.display())
            }
            Self::OutputDirMissing { path } => {
                write!(f, "output directory does not exist: {}", path.display())
            }
            Self::OverwritesInput { side, path } => {
                write!(f, "output would overwrite the {side} file: {}", path.display())
            }
            Self::OutputCollision { path } => {
                write!(f, "two outputs would be written to the same file: {}", path.display())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn check_exists(path: &Path, side: Side) -> Result<(), ValidationError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ValidationError::NotFound { side, path: path.to_path_buf() })
    }
}

pub fn check_csv_extension(path: &Path, side: Side) -> Result<(), ValidationError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        Ok(())
    } else {
        Err(ValidationError::NotCsv { side, path: path.to_path_buf() })
    }
}

/// Compares canonical paths when both resolve, raw paths otherwise.
pub fn check_distinct(source: &Path, target: &Path) -> Result<(), ValidationError> {
    let same = match (source.canonicalize(), target.canonicalize()) {
        (Ok(s), Ok(t)) => s == t,
        _ => source == target,
    };
    if same {
        Err(ValidationError::SameFile { path: source.to_path_buf() })
    } else {
        Ok(())
    }
}

pub fn check_output_dir(dir: &Path) -> Result<(), ValidationError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(ValidationError::OutputDirMissing { path: dir.to_path_buf() })
    }
}

/// Whether two paths name the same file. Paths that do not exist yet are
/// compared through their canonical parent directory.
pub fn same_file(a: &Path, b: &Path) -> bool {
    resolve(a) == resolve(b)
}

fn resolve(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
            match parent.canonicalize() {
                Ok(p) => p.join(name),
                Err(_) => path.to_path_buf(),
            }
        }
        _ => path.to_path_buf(),
    }
}

/// No output may land on an input, and no two outputs on each other.
pub fn check_output_paths(source: &Path, target: &Path, paths: &OutputPaths) -> Result<(), Vec<ValidationError>> {
    let outputs = [&paths.matched, &paths.mismatched, &paths.summary];
    let mut failures = Vec::new();

    for output in outputs {
        for (side, input) in [(Side::Source, source), (Side::Target, target)] {
            if same_file(output, input) {
                failures.push(ValidationError::OverwritesInput { side, path: output.to_path_buf() });
            }
        }
    }
    for (i, a) in outputs.iter().enumerate() {
        for b in &outputs[i + 1..] {
            if same_file(a, b) {
                failures.push(ValidationError::OutputCollision { path: a.to_path_buf() });
            }
        }
    }

    for e in &failures {
        log::error!("validation failed: {e}");
    }
    if failures.is_empty() {
        log::info!("validation passed: output paths are distinct from inputs and each other");
        Ok(())
    } else {
        Err(failures)
    }
}

/// Run every check and report all failures, not just the first.
pub fn validate_inputs(source: &Path, target: &Path, output_dir: &Path) -> Result<(), Vec<ValidationError>> {
    let checks = [
        ("source file exists", check_exists(source, Side::Source)),
        ("target file exists", check_exists(target, Side::Target)),
        ("source file is .csv", check_csv_extension(source, Side::Source)),
        ("target file is .csv", check_csv_extension(target, Side::Target)),
        ("source and target differ", check_distinct(source, target)),
        ("output directory exists", check_output_dir(output_dir)),
    ];

    let mut failures = Vec::new();
    for (name, outcome) in checks {
        match outcome {
            Ok(()) => log::info!("validation passed: {name}"),
            Err(e) => {
                log::error!("validation failed: {e}");
                failures.push(e);
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}
