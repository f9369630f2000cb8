//! Command execution.

use crate::cli::{ManifestArgs, PlaybackArgs};
use crate::error::CliResult;
use crate::output::ProgressReporter;
use reproducir::load_manifest;

/// Validate a manifest and print its URLs.
///
/// # Errors
///
/// Manifest load failures.
pub fn run_manifest(args: &ManifestArgs, reporter: &ProgressReporter) -> CliResult<bool> {
    let urls = load_manifest(&args.urls)?;
    reporter.info(&format!(
        "{} URLs in {}",
        urls.len(),
        args.urls.display()
    ));
    for url in &urls {
        reporter.success(url);
    }
    Ok(true)
}

/// Run playback scenarios for every manifest URL.
///
/// Returns whether every scenario passed.
///
/// # Errors
///
/// Manifest or browser-launch failures; individual scenario failures are
/// reported, persisted, and folded into the return value instead.
pub fn run_playback(args: &PlaybackArgs, reporter: &mut ProgressReporter) -> CliResult<bool> {
    let urls = load_manifest(&args.urls)?;
    reporter.info(&format!(
        "{} URLs loaded from {}",
        urls.len(),
        args.urls.display()
    ));
    execute(args, &urls, reporter)
}

#[cfg(feature = "browser")]
fn execute(
    args: &PlaybackArgs,
    urls: &[String],
    reporter: &mut ProgressReporter,
) -> CliResult<bool> {
    use crate::artifacts::{persist_artifacts, write_report};
    use reproducir::{
        BandwidthLimit, BrowserConfig, CdpSession, PlaybackRunner, ScenarioKind, SuiteReport,
        VideoOptions,
    };
    use std::time::{Duration, Instant};

    let kind = ScenarioKind::from(args.kind);

    let mut video = VideoOptions::new().with_interval(Duration::from_millis(args.interval_ms));
    if let Some(cap) = args.set_duration {
        video = video.with_set_duration(cap);
    }
    let mut options = reproducir::ScenarioOptions::new()
        .with_final_piece(args.final_piece)
        .with_video(video);
    if let Some(secs) = args.timeout_secs {
        options = options.with_max_wait(Duration::from_secs(secs));
    }
    if let Some(kbps) = args.bandwidth_kbps {
        options = options.with_bandwidth(BandwidthLimit::downstream(kbps));
    }

    let mut config = BrowserConfig::new().with_headless(!args.headed);
    if let Some(path) = &args.chromium {
        config = config.with_chromium_path(path.display().to_string());
    }
    if args.no_sandbox {
        config = config.with_no_sandbox();
    }

    let session = CdpSession::launch(config)?;
    let runner = PlaybackRunner::new(session).with_options(options);

    reporter.start_progress(urls.len() as u64, "running scenarios");
    let start = Instant::now();
    let mut reports = Vec::with_capacity(urls.len());
    for url in urls {
        reporter.set_message(url);
        let report = match kind {
            ScenarioKind::Video => runner.run_video(url),
            ScenarioKind::Player => runner.run_player(url),
            ScenarioKind::MediaSourceCheck => runner.run_media_source_check(url),
        };
        reporter.increment();
        if report.is_passed() {
            reporter.success(&format!("{url} [{kind}]"));
        } else {
            reporter.failure(&format!(
                "{url} [{kind}]: {}",
                report.error.as_deref().unwrap_or("unknown failure")
            ));
            for path in persist_artifacts(&args.artifacts, &report)? {
                reporter.info(&format!("artifact: {}", path.display()));
            }
        }
        reports.push(report);
    }
    reporter.finish();

    let suite = SuiteReport {
        reports,
        duration: start.elapsed(),
    };
    if let Some(path) = &args.report {
        write_report(path, &suite)?;
        reporter.info(&format!("report: {}", path.display()));
    }
    reporter.summary(&suite);

    if let Err(error) = runner_session_close(runner) {
        tracing::warn!(%error, "browser close failed");
    }
    Ok(suite.all_passed())
}

#[cfg(feature = "browser")]
fn runner_session_close(
    runner: reproducir::PlaybackRunner<reproducir::CdpSession>,
) -> reproducir::ReproducirResult<()> {
    runner.into_session().close()
}

#[cfg(not(feature = "browser"))]
fn execute(
    _args: &PlaybackArgs,
    _urls: &[String],
    _reporter: &mut ProgressReporter,
) -> CliResult<bool> {
    Err(crate::error::CliError::config(
        "browser control not compiled in; rebuild with --features browser",
    ))
}
