//! Reproductor: command-line harness for Reproducir playback scenarios.
//!
//! ## Usage
//!
//! ```bash
//! reproductor playback --urls default.ini                 # plain <video> runs
//! reproductor playback --urls yt.ini --kind player        # ad-bearing player
//! reproductor playback --urls yt.ini --kind check-src     # media-source check
//! reproductor playback --urls low.ini --bandwidth-kbps 160
//! reproductor manifest --urls default.ini                 # validate a manifest
//! ```

#![warn(missing_docs)]

/// Failure artifact persistence and JSON reports
pub mod artifacts;

/// Command-line surface
pub mod cli;

/// Error types
pub mod error;

/// Output formatting and progress reporting
pub mod output;

/// Command execution
pub mod run;

pub use cli::{Cli, Commands, Kind, ManifestArgs, PlaybackArgs};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use run::{run_manifest, run_playback};
