use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_sync_subcommand() {
    let mut cmd = Command::cargo_bin("docs-translate").expect("binary exists");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn sync_help_documents_the_config_flag() {
    let mut cmd = Command::cargo_bin("docs-translate").expect("binary exists");
    cmd.args(["sync", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn sync_with_missing_config_fails() {
    let mut cmd = Command::cargo_bin("docs-translate").expect("binary exists");
    cmd.args(["sync", "--config", "/definitely/not/here.yaml"]);
    cmd.assert().failure();
}
