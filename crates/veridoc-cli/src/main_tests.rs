// crates/veridoc-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for file read size enforcement in the CLI entry point.
// Purpose: Ensure bounded reads fail closed on oversized inputs.
// Dependencies: veridoc-cli main helpers
// ============================================================================

//! ## Overview
//! Validates `read_bounded_file` enforces size limits for CLI inputs.
//!
//! Security posture: CLI inputs are untrusted; size limits must fail closed.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use super::read_bounded_file;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn temp_file(label: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock drift").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("veridoc-cli-{label}-{nanos}.bin"));
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn read_bounded_file_allows_file_at_limit() {
    let path = temp_file("io-small");
    fs::write(&path, b"%PDF-1.4").unwrap();
    let result = read_bounded_file(&path, 8);
    cleanup(&path);
    assert_eq!(result.unwrap(), b"%PDF-1.4");
}

#[test]
fn read_bounded_file_rejects_oversized_file() {
    let path = temp_file("io-large");
    fs::write(&path, vec![0_u8; 64]).unwrap();
    let result = read_bounded_file(&path, 63);
    cleanup(&path);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("63 byte limit"));
}

#[test]
fn read_bounded_file_reports_missing_file() {
    let path = temp_file("io-missing");
    let err = read_bounded_file(&path, 1024).unwrap_err();
    assert!(err.to_string().contains("cannot read"));
}
