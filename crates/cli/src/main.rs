// tabrecon - compare two CSV files by key

mod exit_codes;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};

use tabrecon_cli::context::{LogSettings, RunContext};
use tabrecon_cli::job::{delimiter_byte, JobConfig, JobError};
use tabrecon_cli::pipeline::{check_inputs, run_compare, CompareInputs, PipelineError, RunOptions, RunOutcome};
use tabrecon_recon::{ReconError, SchemaError};

use exit_codes::{
    EXIT_DUPLICATE_KEYS, EXIT_FORMAT, EXIT_IO, EXIT_JOB, EXIT_NOT_RECONCILED, EXIT_SCHEMA,
    EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "tabrecon")]
#[command(about = "Compare two CSV files by key and split records into matches and mismatches")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors and skip the summary
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Append log records to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a source and a target CSV file
    #[command(after_help = "\
Every column except the first one named Value or Values (any case) is a key
column. Rows are joined on the key columns and their values compared.

Outputs, written to --output-dir:
  <source> Vs. <target> - match records.csv      (only if any record matched)
  <source> Vs. <target> - mismatch records.csv   (only if any record mismatched)
  Summary Stats csv File Compare_<timestamp>.csv (unless --summary is given)

Examples:
  tabrecon compare landing/sales.csv warehouse/sales.csv --output-dir recon
  tabrecon compare a.csv b.csv -o out --summary out/summary.csv --strict-exit
  tabrecon compare a.csv b.csv -o out --dry-run --json")]
    Compare {
        /// Source CSV file
        source: PathBuf,

        /// Target CSV file
        target: PathBuf,

        /// Existing directory for the match and mismatch files
        #[arg(long, short = 'o', value_name = "DIR")]
        output_dir: PathBuf,

        /// Summary file path (default: timestamped name in the output directory)
        #[arg(long, value_name = "FILE")]
        summary: Option<PathBuf>,

        /// Field delimiter for inputs and outputs
        #[arg(long, default_value = ",")]
        delimiter: char,

        #[command(flatten)]
        flags: RunFlags,
    },

    /// Run a comparison described by a TOML job file
    #[command(after_help = "\
Job file:
  source = \"landing/sales.csv\"
  target = \"warehouse/sales.csv\"
  output_dir = \"recon\"
  summary = \"recon/summary.csv\"   # optional
  delimiter = \";\"                 # optional

Relative paths resolve against the job file's directory.")]
    Run {
        /// Job file
        job: PathBuf,

        #[command(flatten)]
        flags: RunFlags,
    },

    /// Check a job file and its paths without comparing anything
    Validate {
        /// Job file
        job: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct RunFlags {
    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Exit 1 when source and target do not reconcile
    #[arg(long)]
    strict_exit: bool,

    /// Compare and report, but write no files
    #[arg(long)]
    dry_run: bool,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("TABRECON_COMMIT"), ")",
        "\nengine:  tabrecon-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TABRECON_TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = RunContext::new(LogSettings::from_flags(cli.verbose, cli.quiet, cli.log_file.clone()));
    if let Err(e) = ctx.init_logging() {
        eprintln!("error: {e}");
        return ExitCode::from(EXIT_IO);
    }
    log::info!("tabrecon {} started", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Compare { source, target, output_dir, summary, delimiter, flags } => {
            compare_inputs(source, target, output_dir, summary, delimiter)
                .and_then(|inputs| cmd_compare(&ctx, &inputs, flags, cli.quiet))
        }
        Commands::Run { job, flags } => cmd_run(&ctx, &job, flags, cli.quiet),
        Commands::Validate { job } => cmd_validate(&ctx, &job),
    };

    match result {
        Ok(()) => {
            log::info!("program successfully completed");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                log::error!("{message}");
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn job(err: JobError) -> Self {
        Self { code: EXIT_JOB, message: err.to_string(), hint: None }
    }

    /// Completed run that did not reconcile. Carries no message; the
    /// summary already said so.
    pub fn not_reconciled() -> Self {
        Self { code: EXIT_NOT_RECONCILED, message: String::new(), hint: None }
    }

    /// Map a pipeline failure onto its exit code.
    pub fn pipeline(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::Validation(_) => Self::args(message)
                .with_hint("check the source, target, output directory and summary paths"),
            PipelineError::Read { .. } | PipelineError::Render(_) | PipelineError::Persist(_) => {
                Self::io(message)
            }
            PipelineError::Recon(ReconError::Schema(SchemaError::DuplicateKeys(_))) => Self {
                code: EXIT_DUPLICATE_KEYS,
                message,
                hint: Some("every key must appear at most once in each file".to_string()),
            },
            PipelineError::Recon(ReconError::Schema(SchemaError::KeyArityMismatch { .. })) => Self {
                code: EXIT_SCHEMA,
                message,
                hint: Some("source and target need the same number of key columns".to_string()),
            },
            PipelineError::Recon(ReconError::Schema(_)) => Self { code: EXIT_SCHEMA, message, hint: None },
            PipelineError::Recon(ReconError::Format { .. }) => Self {
                code: EXIT_FORMAT,
                message,
                hint: Some("use --delimiter if the files are not comma-separated".to_string()),
            },
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// compare / run
// ============================================================================

fn compare_inputs(
    source: PathBuf,
    target: PathBuf,
    output_dir: PathBuf,
    summary: Option<PathBuf>,
    delimiter: char,
) -> Result<CompareInputs, CliError> {
    let delimiter = delimiter_byte(delimiter).map_err(CliError::args)?;
    Ok(CompareInputs { source, target, output_dir, summary, delimiter })
}

fn cmd_compare(ctx: &RunContext, inputs: &CompareInputs, flags: RunFlags, quiet: bool) -> Result<(), CliError> {
    let outcome = run_compare(ctx, inputs, RunOptions { dry_run: flags.dry_run })
        .map_err(CliError::pipeline)?;

    if flags.json {
        let json = serde_json::to_string_pretty(&outcome.report())
            .map_err(|e| CliError::io(format!("cannot serialize run report: {e}")))?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{json}").map_err(|e| CliError::io(e.to_string()))?;
    }

    if !quiet {
        print_summary(&outcome);
    }

    if flags.strict_exit && !outcome.result.is_reconciled() {
        return Err(CliError::not_reconciled());
    }
    Ok(())
}

fn cmd_run(ctx: &RunContext, job_path: &Path, flags: RunFlags, quiet: bool) -> Result<(), CliError> {
    let inputs = load_job(job_path)?;
    cmd_compare(ctx, &inputs, flags, quiet)
}

fn load_job(job_path: &Path) -> Result<CompareInputs, CliError> {
    log::info!("job file: '{}'", job_path.display());
    let text = fs::read_to_string(job_path)
        .map_err(|e| CliError::io(format!("cannot read job file {}: {e}", job_path.display())))?;
    let job = JobConfig::from_toml(&text).map_err(CliError::job)?;
    let base_dir = match job_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    job.resolve(base_dir).map_err(CliError::job)
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(ctx: &RunContext, job_path: &Path) -> Result<(), CliError> {
    let inputs = load_job(job_path)?;
    check_inputs(ctx, &inputs).map_err(CliError::pipeline)?;
    eprintln!(
        "ok: {} vs {} -> {}",
        inputs.source.display(),
        inputs.target.display(),
        inputs.output_dir.display()
    );
    Ok(())
}

// ============================================================================
// Human summary (stderr)
// ============================================================================

fn print_summary(outcome: &RunOutcome) {
    let r = &outcome.result;
    let c = &r.counts;
    let equal = if r.record_count_equal { "equal" } else { "differ" };

    eprintln!(
        "compared {} vs {}",
        outcome.inputs.source.display(),
        outcome.inputs.target.display()
    );
    eprintln!("  records:   source {}, target {} ({})", c.source_count, c.target_count, equal);
    eprintln!("  merged:    {}", c.merged_count);
    eprintln!("  match:     {}", c.match_count);
    eprintln!(
        "  mismatch:  {} ({} only in source, {} only in target)",
        c.mismatch_count, c.source_only_count, c.target_only_count
    );
    if r.is_reconciled() {
        eprintln!("  result:    RECONCILED");
    } else {
        eprintln!("  result:    NOT RECONCILED");
    }

    if outcome.dry_run {
        eprintln!("dry run: no files written");
    } else {
        for path in &outcome.written {
            eprintln!("wrote {}", path.display());
        }
    }
}
