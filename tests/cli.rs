#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn cli(fleet: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("flotte-cli").unwrap();
    cmd.arg("--fleet")
        .arg(fleet)
        .arg("--now")
        .arg("2025-10-01T08:00:00Z");
    cmd
}

#[test]
fn book_then_reject_conflict() {
    let dir = tempdir().unwrap();
    let fleet = dir.path().join("fleet.json");
    let cars = dir.path().join("cars.csv");
    fs::write(&cars, "model,plate,seats\nToyota Camry,ABC-1234,5\n").unwrap();

    cli(&fleet)
        .args(["import-cars", "--csv"])
        .arg(&cars)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 1 car(s)"));

    let book = |start: &str, end: &str| {
        let mut cmd = cli(&fleet);
        cmd.args([
            "book",
            "--plate",
            "ABC-1234",
            "--email",
            "alice@corp.test",
            "--start",
            start,
            "--end",
            end,
        ]);
        cmd
    };

    book("2025-10-01T10:00:00Z", "2025-10-01T12:00:00Z")
        .assert()
        .success();
    book("2025-10-01T11:00:00Z", "2025-10-01T13:00:00Z")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Conflict"));
    book("2025-10-01T12:00:00Z", "2025-10-01T13:00:00Z")
        .assert()
        .success();

    cli(&fleet)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));
}
