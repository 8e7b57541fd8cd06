//! Shared test utilities for the buildgate workspace.
//!
//! Integration tests copy a fixture tree into a temp dir (builds and `clean` write into it),
//! put fake tool scripts on `PATH`, and compare reports after normalizing the fields that
//! change from run to run.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// `tests/fixtures` at the workspace root.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .map(|root| root.join("tests").join("fixtures"))
        .expect("buildgate-test-util lives two levels below the workspace root")
}

/// Copy `tests/fixtures/<name>` into a fresh temp dir and return it with the copy's path.
pub fn copy_fixture(name: &str) -> (TempDir, PathBuf) {
    let src = fixtures_dir().join(name);
    assert!(src.is_dir(), "fixture not found: {}", src.display());
    let tmp = TempDir::new().expect("temp dir");
    let dst = tmp.path().join(name);

    for entry in WalkDir::new(&src) {
        let entry = entry.expect("walk fixture");
        let rel = entry
            .path()
            .strip_prefix(&src)
            .expect("fixture entry under fixture root");
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).expect("create fixture dir");
        } else {
            std::fs::copy(entry.path(), &target).expect("copy fixture file");
        }
    }
    (tmp, dst)
}

/// Write an executable `sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).expect("create script dir");
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// `PATH` with `dir` in front, for running the CLI against fake tools.
pub fn path_with(dir: &Path) -> std::ffi::OsString {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).expect("join PATH")
}

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// `tool.version` is replaced only on a root report envelope (`schema`, `tool`, `operation`,
/// `verdict` and `checks` all present). Timestamps and `duration_ms` are replaced at any
/// depth because their placeholders cannot collide with real data.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "operation", "verdict", "checks"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_envelope
            && let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool.contains_key("version")
        {
            tool.insert("version".to_string(), Value::String("__VERSION__".to_string()));
        }
    }
    normalize_recursive(&mut value);
    value
}

fn normalize_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "finished_at"] {
                if map.contains_key(key) {
                    map.insert(key.to_string(), Value::String("__TIMESTAMP__".to_string()));
                }
            }
            if map.contains_key("duration_ms") {
                map.insert("duration_ms".to_string(), Value::Number(0.into()));
            }
            for val in map.values_mut() {
                normalize_recursive(val);
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(normalize_recursive),
        _ => {}
    }
}
