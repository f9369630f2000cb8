//! Reproductor binary entry point.

use clap::Parser;
use reproductor::{Cli, CliResult, Commands, ProgressReporter};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut reporter = ProgressReporter::new(!cli.no_color, cli.quiet);
    match run(&cli, &mut reporter) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, reporter: &mut ProgressReporter) -> CliResult<bool> {
    match &cli.command {
        Commands::Playback(args) => reproductor::run_playback(args, reporter),
        Commands::Manifest(args) => reproductor::run_manifest(args, reporter),
    }
}

fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "reproducir=info,reproductor=info",
        1 => "reproducir=debug,reproductor=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
