//! Test-only helpers for JSON fixtures and scratch directories.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Two points nested under `points`, the fixture most path tests start from.
pub fn points() -> Value {
    json!({ "points": [ { "x": 10, "y": 20 }, { "x": 40, "y": 50 } ] })
}

/// Fresh temporary directory, removed when dropped.
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

/// Write `value` as pretty JSON to `dir/name` and return the path.
pub fn write_json_file(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    let mut payload = serde_json::to_string_pretty(value).expect("serialize fixture");
    payload.push('\n');
    fs::write(&path, payload).expect("write fixture");
    path
}
