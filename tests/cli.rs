use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;
use tilawa::preferences::STORAGE_KEY;
use tilawa::storage::{KeyValueStore, LocalStorage};

fn command_in(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tilawa").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("RUST_LOG");
    cmd
}

fn seed_storage(home: &TempDir, value: &str) {
    let storage = LocalStorage::open(&home.path().join("tilawa").join("storage.db")).unwrap();
    storage.set_item(STORAGE_KEY, value).unwrap();
}

#[test]
fn test_help_lists_flags() {
    let home = TempDir::new().unwrap();
    command_in(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--chapter"))
        .stdout(predicate::str::contains("--bookmarks"));
}

#[test]
fn test_history_flag_without_data() {
    let home = TempDir::new().unwrap();
    command_in(&home)
        .arg("-r")
        .assert()
        .success()
        .stdout(predicate::str::contains("No chapters read yet"));
    assert!(home.path().join("tilawa").join("configuration.json").exists());
}

#[test]
fn test_history_flag_newest_first() {
    let home = TempDir::new().unwrap();
    seed_storage(
        &home,
        r#"{"history": [{"id": 1, "name": "الفاتحة"}, {"id": 36, "name": "يس"}]}"#,
    );
    command_in(&home)
        .arg("--history")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)36  يس.*1  الفاتحة").unwrap());
}

#[test]
fn test_history_flag_prints_every_stored_entry() {
    let home = TempDir::new().unwrap();
    let entries: Vec<String> = (1..=12)
        .map(|id| format!(r#"{{"id": {id}, "name": "سورة {id}"}}"#))
        .collect();
    seed_storage(&home, &format!(r#"{{"history": [{}]}}"#, entries.join(",")));

    let output = command_in(&home).arg("-r").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[0], " 12  سورة 12");
    assert_eq!(lines[11], "  1  سورة 1");
}

#[test]
fn test_bookmarks_flag_prints_json() {
    let home = TempDir::new().unwrap();
    seed_storage(
        &home,
        r#"{"bookmarks": [{"key": "2:255", "label": "البقرة - 2:255"}]}"#,
    );
    command_in(&home)
        .arg("-b")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key\": \"2:255\""));
}

#[test]
fn test_chapter_out_of_range_rejected() {
    let home = TempDir::new().unwrap();
    command_in(&home)
        .args(["--chapter", "115"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("115"));
}

#[test]
fn test_custom_config_path() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.json");
    std::fs::write(&config, r#"{"Setting": {"verses_per_page": 10}}"#).unwrap();
    command_in(&home)
        .arg("-c")
        .arg(&config)
        .arg("-r")
        .assert()
        .success();
}
