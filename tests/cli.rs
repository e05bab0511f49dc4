use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("vsm-timemap").unwrap()
}

#[test]
fn renders_png_and_plan() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["--plan", "-k", "1", "-o"])
        .arg(dir.path())
        .arg("tests/fixtures/release.csv")
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote chart"));

    let png = std::fs::read(dir.path().join("release.png")).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let plan: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("release.json")).unwrap())
            .unwrap();
    assert_eq!(plan["title"], "release");
    assert_eq!(plan["thresholds"]["ca_threshold"], 90.0);
    assert_eq!(plan["elements"].as_array().unwrap().len(), 4);
}

#[test]
fn rejects_unknown_unit() {
    cmd()
        .args(["-u", "months", "tests/fixtures/release.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown time unit"));
}

#[test]
fn rejects_zero_outliers() {
    cmd()
        .args(["-k", "0", "tests/fixtures/release.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outlier count"));
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .arg("-o")
        .arg(dir.path())
        .arg("does-not-exist.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.csv"));
}

#[test]
fn batch_renders_each_input() {
    let dir = tempfile::tempdir().unwrap();
    let second = dir.path().join("second.csv");
    std::fs::write(&second, "Plan,4,2,80\nShip,2,1,0\n").unwrap();

    cmd()
        .args(["-x", "50", "-o"])
        .arg(dir.path())
        .arg("tests/fixtures/release.csv")
        .arg(&second)
        .assert()
        .success();

    assert!(dir.path().join("release.png").exists());
    assert!(dir.path().join("second.png").exists());
}
