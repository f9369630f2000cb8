//! Smoke tests for the reproductor CLI.
//!
//! Everything here runs without a browser: argument surface, manifest
//! validation, and error reporting.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the reproductor binary
fn reproductor() -> Command {
    Command::cargo_bin("reproductor").expect("reproductor binary should exist")
}

// ============================================================================
// Basic CLI tests
// ============================================================================

#[test]
fn help_flag_describes_the_subcommands() {
    reproductor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("playback"))
        .stdout(predicate::str::contains("manifest"));
}

#[test]
fn version_flag_succeeds() {
    reproductor().arg("--version").assert().success();
}

#[test]
fn no_args_requires_a_subcommand() {
    reproductor().assert().failure();
}

#[test]
fn playback_help_lists_the_tuning_flags() {
    reproductor()
        .args(["playback", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--urls"))
        .stdout(predicate::str::contains("--kind"))
        .stdout(predicate::str::contains("--bandwidth-kbps"))
        .stdout(predicate::str::contains("--set-duration"));
}

// ============================================================================
// Manifest subcommand
// ============================================================================

#[test]
fn manifest_subcommand_lists_urls() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# playback manifest").unwrap();
    writeln!(file, "[https://example.test/clip.webm]").unwrap();
    reproductor()
        .args(["--no-color", "manifest", "--urls"])
        .arg(file.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("https://example.test/clip.webm"));
}

#[test]
fn missing_manifest_fails_with_its_path() {
    reproductor()
        .args(["manifest", "--urls", "/definitely/missing.ini"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.ini"));
}

#[test]
fn empty_manifest_fails() {
    let file = tempfile::NamedTempFile::new().unwrap();
    reproductor()
        .args(["manifest", "--urls"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no URLs found"));
}
