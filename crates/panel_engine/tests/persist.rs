use std::fs;

use panel_engine::{ensure_state_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_state_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_state_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("status.json", "{\"a\":1}").unwrap();
    assert_eq!(first.file_name().unwrap(), "status.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "{\"a\":1}");

    let second = writer.write("status.json", "{\"a\":2}").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "{\"a\":2}");

    // Only the target remains; no temp files are left behind.
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("status.json", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("status.json").exists());
}

#[test]
fn remove_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    writer.write("status.json", "{}").unwrap();

    writer.remove("status.json").unwrap();
    assert!(!temp.path().join("status.json").exists());
    writer.remove("status.json").unwrap();
}
