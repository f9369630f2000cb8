//! Failure artifact persistence.
//!
//! The core produces screenshots and decoder dumps on the failure path; the
//! harness owns writing them to disk and emitting the JSON suite report.

use crate::error::{CliError, CliResult};
use reproducir::{ScenarioReport, SuiteReport};
use std::fs;
use std::path::{Path, PathBuf};

/// Turn a URL into a filesystem-friendly stem
#[must_use]
pub fn sanitize_url(url: &str) -> String {
    let mut stem: String = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    stem.truncate(64);
    while stem.ends_with('-') {
        stem.pop();
    }
    if stem.is_empty() {
        stem.push_str("scenario");
    }
    stem
}

/// Write a failed scenario's artifacts under `dir`.
///
/// Returns the paths written. A passing report writes nothing.
///
/// # Errors
///
/// I/O failures creating the directory or writing files.
pub fn persist_artifacts(dir: &Path, report: &ScenarioReport) -> CliResult<Vec<PathBuf>> {
    let Some(artifacts) = &report.artifacts else {
        return Ok(Vec::new());
    };

    fs::create_dir_all(dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let stem = format!("{}-{stamp}", sanitize_url(&report.url));
    let mut written = Vec::new();

    if let Some(png) = &artifacts.screenshot {
        let path = dir.join(format!("{stem}.png"));
        fs::write(&path, png)?;
        written.push(path);
    }
    if let Some(dump) = &artifacts.debug_dump {
        let path = dir.join(format!("{stem}.txt"));
        fs::write(&path, dump)?;
        written.push(path);
    }
    Ok(written)
}

/// Write the JSON suite report to `path`
///
/// # Errors
///
/// I/O failures, or serialization failures wrapped as report errors.
pub fn write_report(path: &Path, suite: &SuiteReport) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(suite).map_err(|error| CliError::Report {
        message: error.to_string(),
    })?;
    fs::write(path, json)?;
    Ok(())
}
