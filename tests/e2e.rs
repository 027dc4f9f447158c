//! End-to-end tests that invoke the compiled `sql-migrate-parse` binary as a subprocess.
//!
//! These tests exercise CLI argument parsing, config loading, report output,
//! and exit codes.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Locate the compiled binary built by `cargo test`.
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sql-migrate-parse"))
}

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Run the binary from `cwd` with the given arguments.
///
/// The working directory is a fresh temp dir unless given, so a stray
/// `sql-migrate-parse.toml` in the repo never leaks into a test.
fn run_in(cwd: &Path, args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .current_dir(cwd)
        .env_remove("SQL_MIGRATE_LINE_SEPARATOR")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute sql-migrate-parse binary")
}

fn run(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().expect("create temp dir");
    run_in(dir.path(), args)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("fixture path is UTF-8")
}

#[test]
fn test_clean_migrations_exit_zero() {
    let dir = fixture_dir("migrations");
    let output = run(&[path_str(&dir)]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        stderr(&output)
    );

    let out = stdout(&output);
    assert!(out.contains("1_create_users.sql"));
    assert!(out.contains("  up (transaction): 2 statement(s)"));
    assert!(out.contains("    line 5, loop: UPDATE users SET domain = split_part(email, '@', 2) ..."));
    assert!(out.contains("      until: SELECT count(*) FROM users WHERE domain IS NULL;"));
    assert!(out.contains("  down (no transaction): 1 statement(s)"));
    assert!(!out.contains("README"));

    assert!(stderr(&output).contains("sql-migrate-parse: 4 file(s), 0 failed"));
}

#[test]
fn test_broken_script_exits_one_and_reports_all_files() {
    let dir = fixture_dir("broken");
    let output = run(&[path_str(&dir)]);

    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.contains("1_ok.sql\n  up (transaction): 1 statement(s)"));
    assert!(out.contains(
        "  error: line 2: the last statement must be ended by a semicolon or a '-- +migrate StatementEnd' marker"
    ));
    assert!(out.contains(
        "  error: line 2: saw '-- +migrate ConditionalBegin' outside of a matching '-- +migrate LoopBegin'"
    ));
    assert!(stderr(&output).contains("3 file(s), 2 failed"));
}

#[test]
fn test_json_format() {
    let dir = fixture_dir("broken");
    let output = run(&["--format", "json", path_str(&dir)]);
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout is valid JSON");
    let files = value.as_array().expect("top-level array");
    assert_eq!(files.len(), 3);

    assert_eq!(files[0]["ok"], true);
    let up = &files[0]["sections"][0];
    assert_eq!(up["direction"], "up");
    assert_eq!(up["disable_transaction"], false);
    assert_eq!(
        up["statements"][0]["text"],
        "CREATE TABLE ok (id int);\n"
    );
    assert_eq!(up["statements"][0]["is_loop"], false);

    assert_eq!(files[1]["ok"], false);
    assert!(files[1]["error"]
        .as_str()
        .expect("error message")
        .contains("line 2"));
    assert!(files[1].get("sections").is_none());
}

#[test]
fn test_direction_filter() {
    let file = fixture_dir("migrations").join("1_create_users.sql");
    let output = run(&["--direction", "down", "--format", "json", path_str(&file)]);
    assert_eq!(output.status.code(), Some(0));

    let value: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout is valid JSON");
    let sections = value[0]["sections"].as_array().expect("sections");
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0]["direction"], "down");
    assert_eq!(sections[0]["statements"][0]["line"], 10);
}

#[test]
fn test_line_separator_flag() {
    let dir = fixture_dir("separator");

    let without = run(&[path_str(&dir)]);
    assert_eq!(without.status.code(), Some(1));

    let with = run(&["--line-separator", "GO", path_str(&dir)]);
    assert_eq!(with.status.code(), Some(0), "stderr: {}", stderr(&with));
    let out = stdout(&with);
    assert!(out.contains("  up (transaction): 2 statement(s)"));
    assert!(out.contains("    line 2: CREATE TABLE audit (id int, note varchar(100))"));
}

#[test]
fn test_line_separator_from_env() {
    let dir = fixture_dir("separator");
    let cwd = tempfile::tempdir().expect("create temp dir");
    let output = Command::new(binary_path())
        .arg(path_str(&dir))
        .current_dir(cwd.path())
        .env("SQL_MIGRATE_LINE_SEPARATOR", "GO")
        .output()
        .expect("failed to execute sql-migrate-parse binary");
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
}

#[test]
fn test_invalid_line_separator_is_a_tool_error() {
    let dir = fixture_dir("separator");
    let output = run(&["--line-separator=-- split", path_str(&dir)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Invalid --line-separator"));
}

#[test]
fn test_config_file_supplies_paths_and_options() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config_path = dir.path().join("custom.toml");
    let config = format!(
        r#"[migrations]
paths = ["{}"]

[parser]
line_separator = "GO"

[output]
format = "json"
"#,
        path_str(&fixture_dir("separator")).replace('\\', "/")
    );
    std::fs::write(&config_path, config).expect("write config");

    let output = run_in(dir.path(), &["--config", path_str(&config_path)]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let value: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout is valid JSON");
    assert_eq!(value[0]["ok"], true);
    assert_eq!(value[0]["sections"][1]["statements"][1]["text"], "DROP TABLE audit\n");
}

#[test]
fn test_default_config_is_picked_up_from_working_directory() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = format!(
        "[migrations]\npaths = [\"{}\"]\n",
        path_str(&fixture_dir("migrations")).replace('\\', "/")
    );
    std::fs::write(dir.path().join("sql-migrate-parse.toml"), config).expect("write config");

    let output = run_in(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("4_nothing_to_undo.sql"));
}

#[test]
fn test_missing_config_file_exits_two() {
    let output = run(&["--config", "/nonexistent/sql-migrate-parse.toml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Config file not found"));
}

#[test]
fn test_missing_default_paths_exit_two() {
    // No config and no positional paths: db/migrations does not exist in the temp dir.
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to collect migration files"));
}

#[test]
fn test_unknown_format_exits_two() {
    let dir = fixture_dir("migrations");
    let output = run(&["--format", "yaml", path_str(&dir)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unknown output format 'yaml'"));
}
