//! Integration tests for the prosediff CLI tool.
//!
//! These tests verify the complete end-to-end behavior of the CLI,
//! including argument parsing, document loading, and output formatting.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::io::Write;
use tempfile::NamedTempFile;

/// Helper to create a Command for the prosediff binary
fn prosediff() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("prosediff"))
}

fn json_output(args: &[&str]) -> Value {
    let output = prosediff()
        .args(args)
        .args(["-f", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    serde_json::from_slice(&output.stdout).unwrap()
}

fn id_of(report: &Value, change_type: &str, text: &str) -> String {
    report["changes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["type"] == change_type && c["text"] == text)
        .map(|c| c["id"].as_str().unwrap().to_string())
        .unwrap()
}

#[test]
fn test_identical_files_exit_0() {
    prosediff()
        .arg("tests/fixtures/roadmap_original.md")
        .arg("tests/fixtures/roadmap_copy.md")
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_different_files_exit_1() {
    prosediff()
        .arg("tests/fixtures/roadmap_original.md")
        .arg("tests/fixtures/roadmap_edited.md")
        .arg("-f")
        .arg("plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"spring\""))
        .stdout(predicate::str::contains("\"q2\""))
        .stdout(predicate::str::contains("Summary"));
}

#[test]
fn test_file_not_found_exit_2() {
    prosediff()
        .arg("tests/fixtures/nonexistent.md")
        .arg("tests/fixtures/roadmap_original.md")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_structural_changes_reported() {
    prosediff()
        .arg("tests/fixtures/roadmap_original.md")
        .arg("tests/fixtures/roadmap_edited.md")
        .arg("-f")
        .arg("plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Structural changes:"))
        .stdout(predicate::str::contains("heading_level"))
        .stdout(predicate::str::contains("link_target"))
        .stdout(predicate::str::contains("list_nesting"))
        .stdout(predicate::str::contains("3 structural changes"));
}

#[test]
fn test_no_semantic_flag() {
    prosediff()
        .arg("tests/fixtures/roadmap_original.md")
        .arg("tests/fixtures/roadmap_edited.md")
        .arg("-f")
        .arg("plain")
        .arg("--no-semantic")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Structural changes").not())
        .stdout(predicate::str::contains("structural change").not());
}

#[test]
fn test_quiet_mode_hides_summary() {
    prosediff()
        .arg("tests/fixtures/roadmap_original.md")
        .arg("tests/fixtures/roadmap_edited.md")
        .arg("-f")
        .arg("plain")
        .arg("-q")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Summary").not())
        .stdout(predicate::str::contains("\"q2\""));
}

#[test]
fn test_json_output() {
    let report = json_output(&[
        "tests/fixtures/roadmap_original.md",
        "tests/fixtures/roadmap_edited.md",
    ]);
    assert_eq!(report["deletions"], 1);
    assert_eq!(report["insertions"], 3);
    assert_eq!(report["semantic_changes"].as_array().unwrap().len(), 3);
    let first = &report["changes"][0];
    assert!(first["id"].as_str().unwrap().starts_with("c_"));
    assert_eq!(first["location"]["line"], 1);
}

#[test]
fn test_previous_snapshot_keeps_ids() {
    let first = json_output(&[
        "tests/fixtures/roadmap_original.md",
        "tests/fixtures/roadmap_previous.md",
    ]);
    let reconciled = json_output(&[
        "tests/fixtures/roadmap_original.md",
        "tests/fixtures/roadmap_edited.md",
        "--previous",
        "tests/fixtures/roadmap_previous.md",
    ]);
    let fresh = json_output(&[
        "tests/fixtures/roadmap_original.md",
        "tests/fixtures/roadmap_edited.md",
    ]);

    let before = id_of(&first, "deletion", "spring");
    assert_eq!(id_of(&reconciled, "deletion", "spring"), before);
    assert_eq!(
        id_of(&reconciled, "insertion", "q2"),
        id_of(&first, "insertion", "q2")
    );
    // Without the previous snapshot the shifted offset yields a new id.
    assert_ne!(id_of(&fresh, "deletion", "spring"), before);
}

#[test]
fn test_stdin_input() {
    let original = std::fs::read_to_string("tests/fixtures/roadmap_original.md").unwrap();
    prosediff()
        .arg("-")
        .arg("tests/fixtures/roadmap_edited.md")
        .arg("-f")
        .arg("plain")
        .write_stdin(original)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("heading_level"));
}

#[test]
fn test_stdin_twice_is_an_error() {
    prosediff()
        .arg("-")
        .arg("-")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Standard input"));
}

#[test]
fn test_no_cleanup_flag() {
    prosediff()
        .arg("tests/fixtures/roadmap_original.md")
        .arg("tests/fixtures/roadmap_edited.md")
        .arg("--no-cleanup")
        .arg("-f")
        .arg("plain")
        .assert()
        .code(1);
}

#[test]
fn test_max_value_length_truncates() {
    let mut original = NamedTempFile::new().unwrap();
    let mut edited = NamedTempFile::new().unwrap();
    writeln!(original, "start").unwrap();
    writeln!(edited, "start {}", "x".repeat(200)).unwrap();

    prosediff()
        .arg(original.path())
        .arg(edited.path())
        .arg("-f")
        .arg("plain")
        .arg("--max-value-length")
        .arg("12")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\" xxxxxxxx...\""));
}

#[test]
fn test_help() {
    prosediff()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--previous"));
}
