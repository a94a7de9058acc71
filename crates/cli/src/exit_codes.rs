//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on them, so a code never changes meaning once released.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Comparison completed (or job file valid)                  |
//! | 1    | Datasets do not reconcile (only with `--strict-exit`)     |
//! | 2    | Usage or input validation error                           |
//! | 3    | Duplicate keys in source or target                        |
//! | 4    | Other schema error (no columns, key columns differ)       |
//! | 5    | Input is not valid delimited data                         |
//! | 6    | I/O error reading inputs or writing outputs               |
//! | 7    | Job file cannot be parsed or has unusable values          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant with the next free number
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError` in `main.rs`

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Source and target do not reconcile.
/// Like `diff(1)`, exit 1 means "files differ." Opt-in via `--strict-exit`.
pub const EXIT_NOT_RECONCILED: u8 = 1;

/// Usage error - bad arguments, missing or invalid input paths.
pub const EXIT_USAGE: u8 = 2;

/// Duplicate keys found in input.
pub const EXIT_DUPLICATE_KEYS: u8 = 3;

/// Inputs cannot be reconciled as shaped.
pub const EXIT_SCHEMA: u8 = 4;

/// Parse error reading input files.
pub const EXIT_FORMAT: u8 = 5;

/// Filesystem error.
pub const EXIT_IO: u8 = 6;

/// Invalid job file.
pub const EXIT_JOB: u8 = 7;
