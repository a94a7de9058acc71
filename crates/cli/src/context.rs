//! Per-run context: the run timestamp and where log records go.
//!
//! Built once in `main` and passed down; nothing else reads the clock.

use std::fs::OpenOptions;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime};
use log::LevelFilter;

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Append log records to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_flags(verbose: u8, quiet: bool, file: Option<PathBuf>) -> Self {
        Self { level: level_for(verbose, quiet), file }
    }
}

/// 0 = info, 1 = debug, 2+ = trace; quiet wins and keeps only errors.
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

#[derive(Debug, Clone)]
pub struct RunContext {
    started_at: DateTime<Local>,
    log: LogSettings,
}

impl RunContext {
    pub fn new(log: LogSettings) -> Self {
        Self { started_at: Local::now(), log }
    }

    /// Context with a fixed start time.
    pub fn at(started_at: DateTime<Local>, log: LogSettings) -> Self {
        Self { started_at, log }
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at.naive_local()
    }

    pub fn log_settings(&self) -> &LogSettings {
        &self.log
    }

    /// Install the global logger. Call at most once per process.
    pub fn init_logging(&self) -> Result<(), String> {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(self.log.level);

        if let Some(ref path) = self.log.file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("cannot open log file {}: {e}", path.display()))?;
            builder
                .target(env_logger::Target::Pipe(Box::new(file)))
                .write_style(env_logger::WriteStyle::Never);
        }

        builder
            .try_init()
            .map_err(|e| format!("failed to initialize logging: {e}"))
    }
}
