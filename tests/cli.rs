use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

// TEST-NET-1 address: anything that actually touches the network fails fast.
const UNREACHABLE: &str = "http://192.0.2.1/v2";

fn grammarchk() -> Command {
    Command::cargo_bin("grammarchk").unwrap()
}

#[test]
fn help_lists_usage() {
    grammarchk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("grammar"));
}

#[test]
fn empty_stdin_reports_no_issues_without_network() {
    grammarchk()
        .args(["--no-color", "--endpoint", UNREACHABLE, "--timeout", "1"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn whitespace_file_reports_no_issues_without_network() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "  \n\t  ").unwrap();

    grammarchk()
        .args(["--no-color", "--endpoint", UNREACHABLE, "--timeout", "1"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn json_format_emits_a_report_object() {
    grammarchk()
        .args(["--no-color", "-o", "json", "--endpoint", UNREACHABLE])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_issues\": 0"));
}

#[test]
fn missing_file_is_reported_and_skipped() {
    grammarchk()
        .args(["--no-color", "--endpoint", UNREACHABLE])
        .arg("definitely-not-here.txt")
        .assert()
        .success()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn unreachable_endpoint_is_a_readable_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "Ths is a test.").unwrap();

    grammarchk()
        .args(["--no-color", "--endpoint", UNREACHABLE, "--timeout", "1"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Check request failed"));
}

#[test]
fn invalid_language_is_rejected() {
    grammarchk()
        .args(["--language", "english"])
        .write_stdin("hi")
        .assert()
        .failure()
        .stderr(predicate::str::contains("language code"));
}

#[test]
fn fix_requires_a_file() {
    grammarchk()
        .args(["--fix", "--endpoint", UNREACHABLE])
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("standard input"));
}

#[test]
fn interactive_requires_fix() {
    grammarchk().arg("--interactive").assert().failure();
}

#[test]
fn completion_script_is_generated() {
    grammarchk()
        .args(["--completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("grammarchk"));
}
