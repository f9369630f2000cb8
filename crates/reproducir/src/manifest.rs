//! URL manifest loading.
//!
//! A manifest is an ordered list of media URLs, one per record. The format
//! tolerates ini-style section lines (`[https://…]`), bare lines, comments
//! (`#` or `;`) and blanks. The manifest is explicit input threaded into the
//! runner; there is no process-wide default list.

use crate::result::{ReproducirError, ReproducirResult};
use std::path::Path;

/// Parse manifest text into its URL list.
///
/// # Errors
///
/// [`ReproducirError::Manifest`] when no URLs remain after stripping
/// comments and blanks; an empty manifest is configuration gone wrong, not
/// a trivially passing suite.
pub fn parse_manifest(text: &str) -> ReproducirResult<Vec<String>> {
    let urls: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with(';'))
        .map(|line| {
            line.strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .unwrap_or(line)
                .trim()
                .to_string()
        })
        .filter(|url| !url.is_empty())
        .collect();

    if urls.is_empty() {
        return Err(ReproducirError::Manifest {
            path: "<inline>".to_string(),
            message: "no URLs found".to_string(),
        });
    }
    Ok(urls)
}

/// Load a manifest file.
///
/// # Errors
///
/// [`ReproducirError::Manifest`] for unreadable files or empty manifests,
/// with the path in the message.
pub fn load_manifest(path: &Path) -> ReproducirResult<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|error| ReproducirError::Manifest {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;
    parse_manifest(&text).map_err(|error| match error {
        ReproducirError::Manifest { message, .. } => ReproducirError::Manifest {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })
}
