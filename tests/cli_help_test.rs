// CLI surface tests: the binary explains itself without touching the store.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_workflow_commands() {
    let mut cmd = Command::cargo_bin("freigabe").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("approve"))
        .stdout(predicate::str::contains("reject"))
        .stdout(predicate::str::contains("correct"))
        .stdout(predicate::str::contains("archive"))
        .stdout(predicate::str::contains("sweep"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_default_invocation_shows_overview() {
    let mut cmd = Command::cargo_bin("freigabe").unwrap();

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Freigabe"))
        .stdout(predicate::str::contains("freigabe submit"))
        .stdout(predicate::str::contains("freigabe list"));
}

#[test]
fn test_reject_requires_reason_argument() {
    let mut cmd = Command::cargo_bin("freigabe").unwrap();

    cmd.args(["reject", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--reason"));
}

#[test]
fn test_submit_help_documents_distribution_syntax() {
    let mut cmd = Command::cargo_bin("freigabe").unwrap();

    cmd.args(["submit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SITE=QUANTITY"));
}
