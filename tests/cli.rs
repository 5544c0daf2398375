//! End-to-end CLI tests
//!
//! These invoke the compiled binary as a subprocess against pyproject.toml
//! fixtures in temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BOTH_KEYS: &str = r#"
[project]
name = "demo"
version = "1.2.3a4+54321"

[tool.poetry]
name = "demo"
version = "1.2.3a4+54321"
"#;

const PROJECT_ONLY: &str = r#"
[project]
name = "demo"
version = "1.2.3"
"#;

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

fn fixture(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pyproject.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

fn stored_version(path: &Path, poetry: bool) -> String {
    let doc: toml::Table = toml::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    let table = if poetry {
        doc["tool"]["poetry"].as_table().unwrap()
    } else {
        doc["project"].as_table().unwrap()
    };
    table["version"].as_str().unwrap().to_owned()
}

// =============================================================================
// Help & version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// get
// =============================================================================

#[test]
fn get_reports_both_keys_by_default() {
    let (_dir, path) = fixture(BOTH_KEYS);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "get"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project.version: 1.2.3a4+54321"))
        .stdout(predicate::str::contains("tool.poetry.version: 1.2.3a4+54321"));
}

#[test]
fn get_skips_absent_poetry_key_by_default() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "get"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project.version: 1.2.3"))
        .stdout(predicate::str::contains("poetry").not());
}

#[test]
fn get_requested_missing_key_fails() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "get", "--poetry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("tool.poetry.version"));
}

#[test]
fn get_json_outputs_an_object() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    let output = cmd()
        .args(["--pyproject", path.to_str().unwrap(), "--json", "get"])
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["project.version"], "1.2.3");
}

#[test]
fn get_text_outputs_bare_values() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "--text", "get"])
        .assert()
        .success()
        .stdout(predicate::eq("1.2.3\n"));
}

// =============================================================================
// version
// =============================================================================

#[test]
fn version_normalizes_and_writes_both_keys() {
    let (_dir, path) = fixture(BOTH_KEYS);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "version", "V2.0.RC1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 2.0rc1"));
    assert_eq!(stored_version(&path, false), "2.0rc1");
    assert_eq!(stored_version(&path, true), "2.0rc1");
}

#[test]
fn version_never_creates_the_poetry_key() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "version", "2.0"])
        .assert()
        .success();
    let doc: toml::Table = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(!doc.contains_key("tool"));
}

#[test]
fn version_json_output() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "--json", "version", "2.0rc1"])
        .assert()
        .success()
        .stdout(predicate::eq("{\"version\":\"2.0rc1\"}\n"));
    assert_eq!(stored_version(&path, false), "2.0rc1");
}

#[test]
fn version_rejects_malformed_input() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "version", "1.2.3xx7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xx7"));
    assert_eq!(stored_version(&path, false), "1.2.3");
}

// =============================================================================
// set
// =============================================================================

#[test]
fn set_keeps_fields_to_the_right() {
    let (_dir, path) = fixture(BOTH_KEYS);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "set", "minor", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 1.4.3a4+54321"));
    assert_eq!(stored_version(&path, false), "1.4.3a4+54321");
}

#[test]
fn set_clear_right_discards_them() {
    let (_dir, path) = fixture(BOTH_KEYS);
    cmd()
        .args([
            "--pyproject",
            path.to_str().unwrap(),
            "set",
            "minor",
            "5",
            "--clear-right",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 1.5.0"));
    assert_eq!(stored_version(&path, false), "1.5.0");
}

#[test]
fn set_json_output() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "--json", "set", "minor", "4"])
        .assert()
        .success()
        .stdout(predicate::eq("{\"version\":\"1.4.3\"}\n"));
}

#[test]
fn set_unknown_field_is_a_usage_error() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "set", "banana", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("banana"));
}

#[test]
fn set_invalid_value_fails_without_writing() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "set", "minor", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
    assert_eq!(stored_version(&path, false), "1.2.3");
}

#[test]
fn set_local_writes_the_label() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args([
            "--pyproject",
            path.to_str().unwrap(),
            "set",
            "local",
            "foo0123",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 1.2.3+foo0123"));
}

// =============================================================================
// bump
// =============================================================================

#[test]
fn bump_minor_clears_right() {
    let (_dir, path) = fixture(BOTH_KEYS);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "bump", "minor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 1.3.0"));
    assert_eq!(stored_version(&path, false), "1.3.0");
    assert_eq!(stored_version(&path, true), "1.3.0");
}

#[test]
fn bump_epoch_preserves_the_rest() {
    let (_dir, path) = fixture(BOTH_KEYS);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "bump", "epoch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 1!1.2.3a4+54321"));
}

#[test]
fn bump_rc_on_final_release_starts_at_one() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "bump", "rc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 1.2.3rc1"));
}

#[test]
fn bump_text_output() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "--text", "bump", "major"])
        .assert()
        .success()
        .stdout(predicate::eq("2.0.0\n"));
}

#[test]
fn bump_out_of_range_release_ordinal_fails_cleanly() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args([
            "--pyproject",
            path.to_str().unwrap(),
            "bump",
            "release.18446744073709551615",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("out of range"));
    assert_eq!(stored_version(&path, false), "1.2.3");
}

#[test]
fn bump_dry_run_prints_without_writing() {
    let (_dir, path) = fixture(PROJECT_ONLY);
    cmd()
        .args([
            "--pyproject",
            path.to_str().unwrap(),
            "bump",
            "major",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 2.0.0"));
    assert_eq!(stored_version(&path, false), "1.2.3");
}

// =============================================================================
// release
// =============================================================================

#[test]
fn release_strips_suffixes() {
    let (_dir, path) = fixture(BOTH_KEYS);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 1.2.3"));
    assert_eq!(stored_version(&path, false), "1.2.3");
}

#[test]
fn release_json_output() {
    let (_dir, path) = fixture(BOTH_KEYS);
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "--json", "release"])
        .assert()
        .success()
        .stdout(predicate::eq("{\"version\":\"1.2.3\"}\n"));
}

// =============================================================================
// failure plumbing
// =============================================================================

#[test]
fn missing_pyproject_file_fails() {
    cmd()
        .args(["--pyproject", "/nonexistent/pyproject.toml", "get"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn disagreeing_keys_fail_mutations() {
    let (_dir, path) = fixture(
        "[project]\nversion = \"1.2.3\"\n\n[tool.poetry]\nversion = \"1.2.4\"\n",
    );
    cmd()
        .args(["--pyproject", path.to_str().unwrap(), "bump", "minor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("disagree"));
}
