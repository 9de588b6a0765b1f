use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn prints_version() {
    Command::cargo_bin("gamedeals-tui")
        .expect("gamedeals-tui binary")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn prints_help() {
    Command::cargo_bin("gamedeals-tui")
        .expect("gamedeals-tui binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("gamedeals-tui"))
        .stdout(predicate::str::contains("--version"))
        .stdout(predicate::str::contains("--config <path>"));
}

#[test]
fn missing_config_path_is_rejected() {
    Command::cargo_bin("gamedeals-tui")
        .expect("gamedeals-tui binary")
        .arg("--config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--config requires a path"));
}
