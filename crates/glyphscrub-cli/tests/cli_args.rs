use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("glyphscrub").unwrap()
}

#[test]
fn help_flag_prints_usage_with_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("redact"))
        .stdout(predicate::str::contains("tokens"))
        .stdout(predicate::str::contains("terms"));
}

#[test]
fn redact_subcommand_help() {
    cmd()
        .args(["redact", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FILE"))
        .stdout(predicate::str::contains("--map"))
        .stdout(predicate::str::contains("--extra-redact"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--tokens"));
}

#[test]
fn tokens_subcommand_help() {
    cmd()
        .args(["tokens", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FILE"))
        .stdout(predicate::str::contains("--scale"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn terms_subcommand_help() {
    cmd()
        .args(["terms", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--map-file"));
}

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn redact_requires_file_argument() {
    cmd()
        .args(["redact", "-m", "Alan=Bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FILE"));
}

#[test]
fn tokens_missing_file() {
    cmd()
        .args(["tokens", "/nonexistent/scan.png"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: file not found"));
}

#[test]
fn invalid_format_rejected() {
    cmd()
        .args(["terms", "-m", "a=b", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn oversized_scale_rejected() {
    cmd()
        .args(["tokens", "scan.png", "--scale", "1e12"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("scale must be greater than 0"));
}
