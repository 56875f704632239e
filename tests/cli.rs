use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_options() {
    let mut cmd = Command::cargo_bin("lapwatch").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lap splits"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--refresh-ms"));
}

#[test]
fn missing_config_fails_before_ui() {
    let mut cmd = Command::cargo_bin("lapwatch").unwrap();
    cmd.args(["--config", "/definitely/not/here.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lapwatch.toml");
    std::fs::write(&path, "refresh_ms = \"fast\"\n").unwrap();

    let mut cmd = Command::cargo_bin("lapwatch").unwrap();
    cmd.arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
