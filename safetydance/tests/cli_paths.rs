//! CLI tests for `safetydance get/set/unset`.
//!
//! Spawns the binary against scratch documents and checks stdout, the
//! rewritten file, and exit codes.

use std::fs;
use std::process::{Command, Output};

use safetydance::exit_codes;
use safetydance::test_support::{points, scratch_dir, write_json_file};
use serde_json::{Value, json};

fn safetydance(dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_safetydance"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run safetydance")
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read")).expect("parse")
}

#[test]
fn get_prints_value_at_path() {
    let temp = scratch_dir();
    write_json_file(temp.path(), "doc.json", &points());

    let out = safetydance(temp.path(), &["get", "doc.json", "points[1].y"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "50");
}

#[test]
fn get_missing_path_exits_with_missing_code() {
    let temp = scratch_dir();
    write_json_file(temp.path(), "doc.json", &points());

    let out = safetydance(temp.path(), &["get", "doc.json", "points."]);
    assert_eq!(out.status.code(), Some(exit_codes::MISSING));
    assert!(out.stdout.is_empty());
}

#[test]
fn get_missing_path_prints_default() {
    let temp = scratch_dir();
    write_json_file(temp.path(), "doc.json", &points());

    let out = safetydance(
        temp.path(),
        &["get", "doc.json", "points[4].random", "--default", "\"34\""],
    );
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "\"34\"");
}

#[test]
fn get_unreadable_document_reports_error() {
    let temp = scratch_dir();
    fs::write(temp.path().join("bad.json"), "{ nope").expect("write");

    let missing = safetydance(temp.path(), &["get", "missing.json", "x"]);
    assert_eq!(missing.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&missing.stderr).contains("read missing.json"));

    let bad = safetydance(temp.path(), &["get", "bad.json", "x"]);
    assert_eq!(bad.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&bad.stderr).contains("parse bad.json"));
}

#[test]
fn set_creates_document_and_intermediate_objects() {
    let temp = scratch_dir();

    let out = safetydance(temp.path(), &["set", "new.json", "a.b.c", "42"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    assert_eq!(
        read_json(&temp.path().join("new.json")),
        json!({ "a": { "b": { "c": 42 } } })
    );

    let out = safetydance(temp.path(), &["set", "new.json", "a.b", "plain words"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    assert_eq!(
        read_json(&temp.path().join("new.json")),
        json!({ "a": { "b": "plain words" } })
    );
}

#[test]
fn unset_removes_value() {
    let temp = scratch_dir();
    let doc = write_json_file(temp.path(), "doc.json", &json!({ "x": { "y": { "z": 34 } } }));

    let out = safetydance(temp.path(), &["unset", "doc.json", "x.y.z"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    assert_eq!(read_json(&doc), json!({ "x": { "y": {} } }));
}

#[test]
fn compact_output_from_config() {
    let temp = scratch_dir();
    fs::write(temp.path().join("compact.toml"), "[json]\npretty = false\n").expect("write");

    let out = safetydance(
        temp.path(),
        &["set", "doc.json", "k", "[1,2]", "--config", "compact.toml"],
    );
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    assert_eq!(
        fs::read_to_string(temp.path().join("doc.json")).expect("read"),
        "{\"k\":[1,2]}\n"
    );
}

#[test]
fn invalid_config_is_rejected() {
    let temp = scratch_dir();
    fs::write(temp.path().join(".safetydance.toml"), "[exec]\ntimeout_secs = 0\n")
        .expect("write");
    write_json_file(temp.path(), "doc.json", &points());

    let out = safetydance(temp.path(), &["get", "doc.json", "points"]);
    assert_eq!(out.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&out.stderr).contains("timeout_secs"));
}
