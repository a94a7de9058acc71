use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Timestamp embedded in the default summary file name.
pub const SUMMARY_STAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

/// Where the three outputs of a run go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub matched: PathBuf,
    pub mismatched: PathBuf,
    pub summary: PathBuf,
}

impl OutputPaths {
    /// `<dir>/<src> Vs. <tgt> - match records.csv`, the mismatch twin, and
    /// either the given summary path or a timestamped one in `output_dir`.
    /// An empty summary path counts as absent.
    pub fn derive(
        source: &Path,
        target: &Path,
        output_dir: &Path,
        summary: Option<&Path>,
        started_at: NaiveDateTime,
    ) -> Self {
        let prefix = format!("{} Vs. {}", file_stem(source), file_stem(target));
        let summary = match summary.filter(|p| !p.as_os_str().is_empty()) {
            Some(p) => p.to_path_buf(),
            None => output_dir.join(format!(
                "Summary Stats csv File Compare_{}.csv",
                started_at.format(SUMMARY_STAMP_FORMAT)
            )),
        };

        Self {
            matched: output_dir.join(format!("{prefix} - match records.csv")),
            mismatched: output_dir.join(format!("{prefix} - mismatch records.csv")),
            summary,
        }
    }
}

/// File name without its extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
