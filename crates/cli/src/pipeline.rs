// One comparison run: validate, load, reconcile, render, persist.
// Nothing is written unless every step before persistence succeeded.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tabrecon_recon::report::{assemble, SummaryInfo, Table};
use tabrecon_recon::{reconcile, Dataset, ReconCounts, ReconError, ReconResult, Side};

use crate::context::RunContext;
use crate::paths::{file_stem, OutputPaths};
use crate::persist::{self, PendingFile, PersistError};
use crate::validate::{check_output_paths, validate_inputs, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareInputs {
    pub source: PathBuf,
    pub target: PathBuf,
    pub output_dir: PathBuf,
    pub summary: Option<PathBuf>,
    pub delimiter: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Reconcile and report, but write no files.
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum PipelineError {
    Validation(Vec<ValidationError>),
    Read { side: Side, path: PathBuf, source: io::Error },
    Recon(ReconError),
    Render(io::Error),
    Persist(PersistError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(errors) => {
                write!(f, "{} validation(s) failed:", errors.len())?;
                for e in errors {
                    write!(f, "\n  {e}")?;
                }
                Ok(())
            }
            Self::Read { side, path, source } => {
                write!(f, "cannot read {side} file {}: {source}", path.display())
            }
            Self::Recon(e) => write!(f, "{}", e.to_string().trim_end()),
            Self::Render(e) => write!(f, "cannot render output: {e}"),
            Self::Persist(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ReconError> for PipelineError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub inputs: CompareInputs,
    pub paths: OutputPaths,
    pub result: ReconResult,
    /// Files actually written, in write order.
    pub written: Vec<PathBuf>,
    pub timestamp: String,
    pub dry_run: bool,
}

/// Machine-readable run report printed by `--json`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub source: String,
    pub target: String,
    pub key_columns: Vec<String>,
    pub source_measure: Option<String>,
    pub target_measure: Option<String>,
    pub counts: ReconCounts,
    pub record_count_equal: bool,
    pub all_values_match: bool,
    pub reconciled: bool,
    pub outputs: ReportOutputs,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct ReportOutputs {
    pub matched: Option<String>,
    pub mismatched: Option<String>,
    pub summary: String,
    pub written: Vec<String>,
}

impl RunOutcome {
    pub fn report(&self) -> RunReport {
        let r = &self.result;
        RunReport {
            timestamp: self.timestamp.clone(),
            source: display(&self.inputs.source),
            target: display(&self.inputs.target),
            key_columns: r.key_columns.clone(),
            source_measure: r.source_measure.clone(),
            target_measure: r.target_measure.clone(),
            counts: r.counts,
            record_count_equal: r.record_count_equal,
            all_values_match: r.all_values_match,
            reconciled: r.is_reconciled(),
            outputs: ReportOutputs {
                matched: (r.counts.match_count > 0).then(|| display(&self.paths.matched)),
                mismatched: (r.counts.mismatch_count > 0).then(|| display(&self.paths.mismatched)),
                summary: display(&self.paths.summary),
                written: self.written.iter().map(|p| display(p)).collect(),
            },
            dry_run: self.dry_run,
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

pub fn run_compare(
    ctx: &RunContext,
    inputs: &CompareInputs,
    options: RunOptions,
) -> Result<RunOutcome, PipelineError> {
    log::info!("source file: '{}'", inputs.source.display());
    log::info!("target file: '{}'", inputs.target.display());
    log::info!("output directory: '{}'", inputs.output_dir.display());
    if let Some(ref summary) = inputs.summary {
        log::info!("summary file: '{}'", summary.display());
    }

    let paths = check_inputs(ctx, inputs)?;
    let started_at = ctx.started_at();

    let source = load_dataset(&inputs.source, Side::Source, inputs.delimiter)?;
    let target = load_dataset(&inputs.target, Side::Target, inputs.delimiter)?;
    log::info!("records in source file: {}", source.len());
    log::info!("records in target file: {}", target.len());

    let result = reconcile(&source, &target)?;
    log_result(&result);

    let info = SummaryInfo {
        source_name: file_stem(&inputs.source),
        target_name: file_stem(&inputs.target),
        timestamp: started_at,
        source_path: display(&inputs.source),
        target_path: display(&inputs.target),
        match_path: display(&paths.matched),
        mismatch_path: display(&paths.mismatched),
    };
    let report = assemble(&result, &info);

    let mut pending = Vec::with_capacity(3);
    stage_table(&mut pending, report.matched.as_ref(), &paths.matched, inputs.delimiter, "match")?;
    stage_table(&mut pending, report.mismatched.as_ref(), &paths.mismatched, inputs.delimiter, "mismatch")?;
    stage_table(&mut pending, Some(&report.summary), &paths.summary, inputs.delimiter, "summary")?;

    let written: Vec<PathBuf> = if options.dry_run {
        log::info!("dry run: {} file(s) not written", pending.len());
        Vec::new()
    } else {
        persist::write_all(&pending).map_err(PipelineError::Persist)?;
        for file in &pending {
            log::info!("exported '{}'", file.path.display());
        }
        pending.into_iter().map(|f| f.path).collect()
    };

    Ok(RunOutcome {
        inputs: inputs.clone(),
        paths,
        result,
        written,
        timestamp: started_at.format(tabrecon_recon::report::TIMESTAMP_FORMAT).to_string(),
        dry_run: options.dry_run,
    })
}

/// Validate the inputs, derive the output paths and make sure no output
/// lands on an input or on another output. Touches nothing on disk.
pub fn check_inputs(ctx: &RunContext, inputs: &CompareInputs) -> Result<OutputPaths, PipelineError> {
    validate_inputs(&inputs.source, &inputs.target, &inputs.output_dir)
        .map_err(PipelineError::Validation)?;

    let paths = OutputPaths::derive(
        &inputs.source,
        &inputs.target,
        &inputs.output_dir,
        inputs.summary.as_deref(),
        ctx.started_at(),
    );
    log::info!("match records file: '{}'", paths.matched.display());
    log::info!("mismatch records file: '{}'", paths.mismatched.display());
    log::info!("summary stats file: '{}'", paths.summary.display());

    check_output_paths(&inputs.source, &inputs.target, &paths).map_err(PipelineError::Validation)?;
    Ok(paths)
}

/// Read and parse one input file.
pub fn load_dataset(path: &Path, side: Side, delimiter: u8) -> Result<Dataset, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::Read {
        side,
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = Dataset::from_reader(BufReader::new(file), delimiter).map_err(|e| e.on_side(side))?;
    log::debug!(
        "{side} columns: {}",
        dataset.columns().join(", ")
    );
    Ok(dataset)
}

fn stage_table(
    pending: &mut Vec<PendingFile>,
    table: Option<&Table>,
    path: &Path,
    delimiter: u8,
    label: &str,
) -> Result<(), PipelineError> {
    match table {
        Some(table) => {
            let contents = table.to_csv_bytes(delimiter).map_err(PipelineError::Render)?;
            log::debug!("{label} table: {} row(s) for '{}'", table.len(), path.display());
            pending.push(PendingFile { path: path.to_path_buf(), contents });
        }
        None => log::info!("no {label} records; '{}' not created", path.display()),
    }
    Ok(())
}

fn log_result(result: &ReconResult) {
    let c = &result.counts;
    log::info!("key columns: {}", result.key_columns.join(", "));
    log::info!("records in merged data: {}", c.merged_count);
    log::debug!(
        "keys only in source: {}, only in target: {}",
        c.source_only_count,
        c.target_only_count
    );

    if result.record_count_equal {
        log::info!("record counts of source and target match");
    } else {
        log::info!("record counts of source and target do not match");
    }

    if result.all_values_match {
        log::info!("every value in the source file matches the target file");
    } else {
        log::info!("some source and target values do not match");
    }

    if result.is_reconciled() {
        log::info!("overall result: record counts and every value match");
    } else {
        log::info!("overall result: source and target do not reconcile");
    }

    if c.merged_count == c.match_count + c.mismatch_count {
        log::info!(
            "sum check passed: merged records {} = match records {} + mismatch records {}",
            c.merged_count,
            c.match_count,
            c.mismatch_count
        );
    } else {
        log::error!(
            "sum check failed: merged records {} != match records {} + mismatch records {}",
            c.merged_count,
            c.match_count,
            c.mismatch_count
        );
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
