//! Corruption recovery tests for the exlog binary.
//!
//! These tests verify the store copes with:
//! - A journal whose last write was torn by a crash
//! - Journals made only of unparseable lines
//! - Corrupted snapshot files

use assert_cmd::Command;
use exlog_core::jsonl_store::{JOURNAL_FILE, SNAPSHOT_FILE};
use exlog_core::{DurationValue, ExerciseService, JsonlStore, NewExercise};
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn cli(dir: &Path) -> Command {
    let config = dir.join("config.toml");
    fs::write(&config, "").expect("Failed to write config");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("exlog"));
    for var in ["PORT", "EXLOG_HOST", "EXLOG_DATA_DIR", "EXLOG_STORE"] {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir).arg("--config").arg(config);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn new_exercise(description: &str, date: &str) -> NewExercise {
    NewExercise {
        description: Some(description.into()),
        duration: Some(DurationValue::Int(25)),
        date: Some(date.into()),
    }
}

#[tokio::test]
async fn test_append_after_torn_journal_is_exported() {
    let temp_dir = setup_test_dir();

    let id = {
        let store = JsonlStore::open(temp_dir.path()).unwrap();
        let service = ExerciseService::new(Arc::new(store));
        let user = service.create_user(Some("alice")).await.unwrap();
        service
            .append_exercise(&user.id.to_string(), new_exercise("run", "2023-02-01"))
            .await
            .unwrap();
        user.id.to_string()
    };

    // Simulate a crash in the middle of writing the next event
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(temp_dir.path().join(JOURNAL_FILE))
        .unwrap();
    write!(file, r#"{{"op":"exercise_appended","user_id":"{}","exer"#, id).unwrap();
    drop(file);

    {
        let store = JsonlStore::open(temp_dir.path()).unwrap();
        let service = ExerciseService::new(Arc::new(store));
        service
            .append_exercise(&id, new_exercise("swim", "2023-02-02"))
            .await
            .unwrap();
    }

    cli(temp_dir.path())
        .arg("export")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--user")
        .arg(&id)
        .assert()
        .success()
        .stdout(predicate::str::contains("2023-02-01,run,25"))
        .stdout(predicate::str::contains("2023-02-02,swim,25"));
}

#[test]
fn test_garbage_journal_compacts_to_empty_snapshot() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join(JOURNAL_FILE),
        "{ invalid json }\n{ more invalid }",
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("compact")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Compacted 0 users"));
}

#[test]
fn test_corrupted_snapshot_refuses_to_open() {
    let temp_dir = setup_test_dir();
    let snapshot_path = temp_dir.path().join(SNAPSHOT_FILE);
    fs::write(&snapshot_path, "{ invalid json }}}}").unwrap();

    cli(temp_dir.path())
        .arg("compact")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Persistence"));

    // The damaged snapshot is left for inspection
    assert_eq!(
        fs::read_to_string(&snapshot_path).unwrap(),
        "{ invalid json }}}}"
    );
}
