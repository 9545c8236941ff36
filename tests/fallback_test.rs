use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let mut cmd = Command::new(cargo_bin!("billsplit"));
    cmd.args(["--ledger", "tests/fixtures/trip.json"])
        .args(["--db-path", "some_db"])
        .args(["balances", "--group", "trip", "--viewer", "a", "--format", "csv"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage.",
        ))
        .stdout(predicate::str::contains("b,Bob,0.00,70.00,70.00"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("billsplit"));
    cmd.args(["--ledger", "tests/fixtures/trip.json"])
        .arg("--db-path")
        .arg(&db_path)
        .args(["balances", "--group", "trip", "--viewer", "a"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
