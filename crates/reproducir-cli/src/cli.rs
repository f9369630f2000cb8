//! Command-line surface.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use reproducir::ScenarioKind;
use std::path::PathBuf;

/// Reproducir CLI: run media playback scenarios against a manifest of URLs
#[derive(Debug, Parser)]
#[command(name = "reproductor", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print failures and the final summary
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run playback scenarios for every URL in a manifest
    Playback(PlaybackArgs),
    /// Validate a manifest and list its URLs
    Manifest(ManifestArgs),
}

/// Which scenario to run per URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Kind {
    /// Plain HTML5 `<video>` playback
    #[default]
    Video,
    /// Embedded ad-bearing player playback
    Player,
    /// Media-source delivery check
    CheckSrc,
}

impl From<Kind> for ScenarioKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Video => Self::Video,
            Kind::Player => Self::Player,
            Kind::CheckSrc => Self::MediaSourceCheck,
        }
    }
}

/// Arguments for `reproductor playback`
#[derive(Debug, Args)]
pub struct PlaybackArgs {
    /// Manifest of media URLs (ini section lines or bare lines)
    #[arg(long, value_name = "FILE")]
    pub urls: PathBuf,

    /// Scenario kind to run per URL
    #[arg(long, value_enum, default_value = "video")]
    pub kind: Kind,

    /// Hard cap on any single wait, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Play only the first N seconds of each video
    #[arg(long, value_name = "SECS")]
    pub set_duration: Option<f64>,

    /// Seconds of video left to the completion wait after ad skipping
    #[arg(long, value_name = "SECS", default_value_t = 60.0)]
    pub final_piece: f64,

    /// Polling interval in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub interval_ms: u64,

    /// Downstream bandwidth cap in kbps (e.g. 160, 250, 500, 1000)
    #[arg(long, value_name = "KBPS")]
    pub bandwidth_kbps: Option<u32>,

    /// Directory for failure screenshots and decoder dumps
    #[arg(long, value_name = "DIR", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Write a JSON suite report to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Run the browser with a visible window
    #[arg(long)]
    pub headed: bool,

    /// Chromium binary to launch
    #[arg(long, value_name = "PATH", env = "CHROMIUM_PATH")]
    pub chromium: Option<PathBuf>,

    /// Disable the browser sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,
}

/// Arguments for `reproductor manifest`
#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Manifest file to validate
    #[arg(long, value_name = "FILE")]
    pub urls: PathBuf,
}
