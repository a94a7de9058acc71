// End-to-end tests for `tabrecon compare`, `run` and `validate`.
//
// Run with: cargo test -p tabrecon-cli --test compare_tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn tabrecon() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tabrecon"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../recon/tests/fixtures").join(name)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Temp workspace with `src.csv`, `tgt.csv` and an empty `out/`.
fn workspace(source: &str, target: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("src.csv"), source).unwrap();
    fs::write(dir.path().join("tgt.csv"), target).unwrap();
    fs::create_dir(dir.path().join("out")).unwrap();
    dir
}

fn compare(dir: &Path, extra: &[&str]) -> Output {
    tabrecon()
        .arg("compare")
        .arg(dir.join("src.csv"))
        .arg(dir.join("tgt.csv"))
        .arg("--output-dir")
        .arg(dir.join("out"))
        .args(extra)
        .output()
        .expect("run tabrecon compare")
}

fn out_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ===========================================================================
// compare
// ===========================================================================

#[test]
fn sales_fixture_writes_all_three_files() {
    let out = tempfile::tempdir().unwrap();
    let output = tabrecon()
        .arg("compare")
        .arg(fixture("sales_source.csv"))
        .arg(fixture("sales_target.csv"))
        .arg("-o")
        .arg(out.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let mismatch = fs::read_to_string(out.path().join("sales_source Vs. sales_target - mismatch records.csv")).unwrap();
    assert_eq!(
        mismatch,
        "Region,Product,Year,value_source,value_target\n\
         South,Widget,2020,75,80\n\
         East,Widget,2021,310,\n\
         Central,Widget,2021,,19\n"
    );

    let matched = fs::read_to_string(out.path().join("sales_source Vs. sales_target - match records.csv")).unwrap();
    assert_eq!(matched.lines().count(), 5, "header + 4 matches:\n{matched}");
    assert!(matched.contains("North,Widget,2020,100,100\n"));
    assert!(matched.contains("South,Gadget,2020,,\n"));

    let summary = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.file_name().unwrap().to_string_lossy().starts_with("Summary Stats csv File Compare_"))
        .expect("timestamped summary file");
    let text = fs::read_to_string(summary).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("Source File Name,Target File Name,Date & Time,"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("sales_source,sales_target,"), "{row}");
    assert!(row.contains(",6,6,4,3,0,"), "{row}");

    let err = stderr(&output);
    assert!(err.contains("NOT RECONCILED"), "{err}");
    assert!(err.contains("sum check passed"), "{err}");
}

#[test]
fn reconciled_inputs_skip_mismatch_file() {
    let dir = workspace("id,Value\n1,10\n2,20\n", "id,VALUE\n2,20.0\n1,10\n");
    let output = compare(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let files = out_files(dir.path());
    assert_eq!(files.len(), 2, "{files:?}");
    assert!(files[0].starts_with("Summary Stats csv File Compare_"), "{files:?}");
    assert_eq!(files[1], "src Vs. tgt - match records.csv");
    assert!(stderr(&output).contains("RECONCILED"));
}

#[test]
fn explicit_summary_path() {
    let dir = workspace("id,Value\n1,10\n", "id,Value\n1,10\n");
    let summary = dir.path().join("summary.csv");
    let output = compare(dir.path(), &["--summary", summary.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(summary.exists());
    assert_eq!(out_files(dir.path()), vec!["src Vs. tgt - match records.csv".to_string()]);
}

#[test]
fn strict_exit_reports_mismatch() {
    let dir = workspace("id,Value\n1,10\n", "id,Value\n1,11\n");
    let output = compare(dir.path(), &["--strict-exit"]);
    assert_eq!(output.status.code(), Some(1));
    // Outputs are still written
    assert_eq!(out_files(dir.path()).len(), 2);
    assert!(!stderr(&output).contains("error:"));
}

#[test]
fn strict_exit_passes_when_reconciled() {
    let dir = workspace("id,Value\n1,10\n", "id,Value\n1,10\n");
    let output = compare(dir.path(), &["--strict-exit"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn mismatch_without_strict_exit_is_success() {
    let dir = workspace("id,Value\n1,10\n", "id,Value\n2,10\n");
    let output = compare(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = workspace("id,Value\n1,10\n", "id,Value\n1,11\n");
    let output = compare(dir.path(), &["--dry-run"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(out_files(dir.path()).is_empty());
    assert!(stderr(&output).contains("dry run"));
}

#[test]
fn semicolon_delimiter() {
    let dir = workspace("id;Value\n1;1,5\n", "id;Value\n1;1,5\n");
    let output = compare(dir.path(), &["--delimiter", ";"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let matched = fs::read_to_string(dir.path().join("out/src Vs. tgt - match records.csv")).unwrap();
    assert_eq!(matched, "id;value_source;value_target\n1;1,5;1,5\n");
}

#[test]
fn quiet_keeps_stderr_clean() {
    let dir = workspace("id,Value\n1,10\n", "id,Value\n1,10\n");
    let output = compare(dir.path(), &["-q"]);
    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());
}

#[test]
fn log_file_receives_records() {
    let dir = workspace("id,Value\n1,10\n", "id,Value\n1,10\n");
    let log = dir.path().join("run.log");
    let output = compare(dir.path(), &["--log-file", log.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("validation passed: source file exists"), "{text}");
    assert!(text.contains("records in merged data: 1"), "{text}");
    assert!(text.contains("program successfully completed"), "{text}");
    assert!(!stderr(&output).contains("validation passed"));
}

// ===========================================================================
// compare: failures
// ===========================================================================

#[test]
fn missing_source_is_usage_error() {
    let dir = workspace("id,Value\n", "id,Value\n");
    fs::remove_file(dir.path().join("src.csv")).unwrap();
    let output = compare(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("source file does not exist"), "{err}");
    assert!(err.contains("hint:"), "{err}");
    assert!(out_files(dir.path()).is_empty());
}

#[test]
fn same_file_twice_is_usage_error() {
    let dir = workspace("id,Value\n1,1\n", "id,Value\n");
    let src = dir.path().join("src.csv");
    let output = tabrecon()
        .arg("compare")
        .arg(&src)
        .arg(&src)
        .arg("-o")
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("same file"));
}

#[test]
fn summary_over_input_is_usage_error() {
    let dir = workspace("id,Value\n1,1\n", "id,Value\n1,1\n");
    let target = dir.path().join("tgt.csv");
    let output = compare(dir.path(), &["--summary", target.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("output would overwrite the target file"));
    assert_eq!(fs::read_to_string(&target).unwrap(), "id,Value\n1,1\n");
    assert!(out_files(dir.path()).is_empty());
}

#[test]
fn rerun_replaces_previous_outputs() {
    let dir = workspace("id,Value\n1,1\n", "id,Value\n1,1\n");
    let summary = dir.path().join("out/summary.csv");
    let first = compare(dir.path(), &["--summary", summary.to_str().unwrap()]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let second = compare(dir.path(), &["--summary", summary.to_str().unwrap()]);
    assert!(second.status.success(), "stderr: {}", stderr(&second));
    assert_eq!(
        out_files(dir.path()),
        vec!["src Vs. tgt - match records.csv".to_string(), "summary.csv".to_string()]
    );
}

#[test]
fn missing_output_dir_is_usage_error() {
    let dir = workspace("id,Value\n1,1\n", "id,Value\n1,1\n");
    fs::remove_dir(dir.path().join("out")).unwrap();
    let output = compare(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("output directory does not exist"));
}

#[test]
fn duplicate_keys_exit_3_and_write_nothing() {
    let dir = workspace("id,Value\n1,10\n1,11\n", "id,Value\n1,10\n");
    let output = compare(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("duplicate keys"), "{err}");
    assert!(err.contains("source key \"1\" appears 2 times"), "{err}");
    assert!(out_files(dir.path()).is_empty());
}

#[test]
fn key_arity_mismatch_exit_4() {
    let dir = workspace("a,b,Value\n1,2,3\n", "a,Value\n1,3\n");
    let output = compare(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("key columns differ"));
}

#[test]
fn empty_input_exit_4() {
    let dir = workspace("", "id,Value\n1,3\n");
    let output = compare(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("source dataset has no columns"));
}

#[test]
fn ragged_rows_exit_5() {
    let dir = workspace("id,Value\n1,10\n", "id,Value\n1,10,extra\n");
    let output = compare(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("target file is not valid delimited data"));
    assert!(out_files(dir.path()).is_empty());
}

#[test]
fn non_ascii_delimiter_rejected() {
    let dir = workspace("id,Value\n", "id,Value\n");
    let output = compare(dir.path(), &["--delimiter", "§"]);
    assert_eq!(output.status.code(), Some(2));
}

// ===========================================================================
// run / validate
// ===========================================================================

fn write_job(dir: &Path, body: &str) -> PathBuf {
    let job = dir.join("job.toml");
    fs::write(&job, body).unwrap();
    job
}

#[test]
fn run_resolves_paths_against_job_dir() {
    let dir = workspace("id,Value\n1,10\n2,5\n", "id,Value\n1,10\n2,6\n");
    let job = write_job(
        dir.path(),
        "source = \"src.csv\"\ntarget = \"tgt.csv\"\noutput_dir = \"out\"\nsummary = \"out/summary.csv\"\n",
    );
    let output = tabrecon().arg("run").arg(&job).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        out_files(dir.path()),
        vec![
            "src Vs. tgt - match records.csv".to_string(),
            "src Vs. tgt - mismatch records.csv".to_string(),
            "summary.csv".to_string(),
        ]
    );
}

#[test]
fn run_with_unknown_field_exit_7() {
    let dir = workspace("id,Value\n", "id,Value\n");
    let job = write_job(dir.path(), "source = \"src.csv\"\ntarget = \"tgt.csv\"\noutput_dir = \"out\"\nkey = \"id\"\n");
    let output = tabrecon().arg("run").arg(&job).output().unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(stderr(&output).contains("job file parse error"));
}

#[test]
fn run_missing_job_file_exit_6() {
    let dir = tempfile::tempdir().unwrap();
    let output = tabrecon().arg("run").arg(dir.path().join("nope.toml")).output().unwrap();
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn validate_accepts_good_job_without_writing() {
    let dir = workspace("id,Value\n1,10\n", "id,Value\n1,11\n");
    let job = write_job(dir.path(), "source = \"src.csv\"\ntarget = \"tgt.csv\"\noutput_dir = \"out\"\n");
    let output = tabrecon().arg("validate").arg(&job).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("ok:"));
    assert!(out_files(dir.path()).is_empty());
}

#[test]
fn validate_reports_every_problem() {
    let dir = workspace("id,Value\n", "id,Value\n");
    let job = write_job(dir.path(), "source = \"a.txt\"\ntarget = \"tgt.csv\"\noutput_dir = \"missing\"\n");
    let output = tabrecon().arg("validate").arg(&job).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("3 validation(s) failed"), "{err}");
    assert!(err.contains("source file does not exist"), "{err}");
    assert!(err.contains("source file is not a .csv file"), "{err}");
    assert!(err.contains("output directory does not exist"), "{err}");
}

#[test]
fn version_flag() {
    let output = tabrecon().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
