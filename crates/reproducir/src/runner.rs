//! Scenario orchestration.
//!
//! A [`PlaybackRunner`] owns the remote session for the whole run and plays
//! one scenario per manifest URL, sequentially: start detection, ad-skip
//! loop where the target has one, completion wait, failure classification.
//! On failure it captures the report artifacts (screenshot, decoder dump);
//! persisting them is the harness's job, not the core's.

use crate::ads::AdSkipCoordinator;
use crate::player::{
    decoder_debug_dump, AdAwarePlayer, EmbeddedPlayer, Html5Video, MediaTarget, VideoOptions,
    PLAYER_VIDEO_SELECTOR,
};
use crate::result::{ReproducirError, ReproducirResult};
use crate::session::{BandwidthLimit, Selector, Session};
use crate::state::{element_playback_done, playback_started, ELEMENT_DONE_EPSILON_S};
use crate::wait::{WaitOptions, Waiter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant, SystemTime};

/// Prefix a media source carries when delivered through media-source
/// extensions
pub const MEDIA_SOURCE_PREFIX: &str = "mediasource";

// =============================================================================
// OPTIONS
// =============================================================================

/// Tuning for a playback run
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    /// Budget for a bare `<video>` to start playing
    pub startup_timeout: Duration,
    /// Budget for an embedded player to start playing (initial ads included)
    pub player_startup_timeout: Duration,
    /// Factor applied to expected durations when computing completion budgets
    pub timeout_factor: f64,
    /// Seconds of video the completion wait is allowed to own at the end
    pub final_piece: f64,
    /// Hard cap on any single computed wait, when a run budget is imposed
    pub max_wait: Option<Duration>,
    /// Bandwidth cap applied before each scenario
    pub bandwidth: Option<BandwidthLimit>,
    /// Media-target construction options (poll interval, duration cap, ...)
    pub video: VideoOptions,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            startup_timeout: Duration::from_secs(30),
            player_startup_timeout: Duration::from_secs(60),
            timeout_factor: 1.3,
            final_piece: 60.0,
            max_wait: None,
            bandwidth: None,
            video: VideoOptions::default(),
        }
    }
}

impl ScenarioOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the startup budgets
    #[must_use]
    pub const fn with_startup_timeout(mut self, element: Duration, player: Duration) -> Self {
        self.startup_timeout = element;
        self.player_startup_timeout = player;
        self
    }

    /// Set the final piece handed to the completion wait
    #[must_use]
    pub const fn with_final_piece(mut self, seconds: f64) -> Self {
        self.final_piece = seconds;
        self
    }

    /// Cap every computed wait at `budget`
    #[must_use]
    pub const fn with_max_wait(mut self, budget: Duration) -> Self {
        self.max_wait = Some(budget);
        self
    }

    /// Apply a bandwidth cap before each scenario
    #[must_use]
    pub const fn with_bandwidth(mut self, limit: BandwidthLimit) -> Self {
        self.bandwidth = Some(limit);
        self
    }

    /// Set the media-target construction options
    #[must_use]
    pub fn with_video(mut self, video: VideoOptions) -> Self {
        self.video = video;
        self
    }

    fn budget_secs(&self, secs: f64) -> f64 {
        match self.max_wait {
            Some(cap) => secs.min(cap.as_secs_f64()),
            None => secs,
        }
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// What kind of scenario a URL was run through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Plain HTML5 `<video>` playback
    Video,
    /// Embedded ad-bearing player playback
    Player,
    /// Media-source delivery check
    MediaSourceCheck,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video-playback"),
            Self::Player => write!(f, "player-playback"),
            Self::MediaSourceCheck => write!(f, "media-source-check"),
        }
    }
}

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    /// Everything the scenario asserted held
    Passed,
    /// A wait budget ran out; the caller may retry
    TimedOut,
    /// Playback stopped with no legitimate excuse; terminal
    Stalled,
    /// The decode pipeline contradicted itself; terminal
    Inconsistent,
    /// The remote session failed underneath the scenario
    SessionFailed,
}

impl ScenarioStatus {
    /// Classify an error into a status
    #[must_use]
    pub fn from_error(error: &ReproducirError) -> Self {
        match error {
            ReproducirError::Timeout { .. } => Self::TimedOut,
            ReproducirError::Stall { .. } => Self::Stalled,
            ReproducirError::Inconsistency { .. } => Self::Inconsistent,
            _ => Self::SessionFailed,
        }
    }

    /// Whether this status is a pass
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Evidence captured when a scenario fails
#[derive(Debug, Clone)]
pub struct FailureArtifacts {
    /// PNG screenshot of the page, when capture succeeded
    pub screenshot: Option<Vec<u8>>,
    /// Decoder debug dump, when the backend exposes one
    pub debug_dump: Option<String>,
    /// When the artifacts were captured
    pub captured_at: SystemTime,
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// URL the scenario ran against
    pub url: String,
    /// Which scenario ran
    pub kind: ScenarioKind,
    /// How it ended
    pub status: ScenarioStatus,
    /// Error message if it failed
    pub error: Option<String>,
    /// Wall-clock duration of the scenario
    pub duration: Duration,
    /// Captured evidence, absent on pass
    #[serde(skip)]
    pub artifacts: Option<FailureArtifacts>,
}

impl ScenarioReport {
    /// Whether the scenario passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        self.status.is_passed()
    }
}

/// Aggregated results of a manifest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Individual scenario reports, in manifest order
    pub reports: Vec<ScenarioReport>,
    /// Total wall-clock duration
    pub duration: Duration,
}

impl SuiteReport {
    /// Check if every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(ScenarioReport::is_passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_passed()).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.reports.len() - self.passed_count()
    }

    /// Total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// The failing reports
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.reports.iter().filter(|r| !r.is_passed()).collect()
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Runs playback scenarios against one exclusively owned session
pub struct PlaybackRunner<S: Session> {
    session: S,
    options: ScenarioOptions,
    coordinator: AdSkipCoordinator,
}

impl<S: Session> fmt::Debug for PlaybackRunner<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackRunner")
            .field("options", &self.options)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl<S: Session> PlaybackRunner<S> {
    /// Create a runner with default options
    #[must_use]
    pub fn new(session: S) -> Self {
        Self {
            session,
            options: ScenarioOptions::default(),
            coordinator: AdSkipCoordinator::default(),
        }
    }

    /// Replace the scenario options
    #[must_use]
    pub fn with_options(mut self, options: ScenarioOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the ad-skip coordinator
    #[must_use]
    pub fn with_coordinator(mut self, coordinator: AdSkipCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    /// The session this runner owns
    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Consume the runner and hand the session back
    #[must_use]
    pub fn into_session(self) -> S {
        self.session
    }

    /// The active options
    #[must_use]
    pub const fn options(&self) -> &ScenarioOptions {
        &self.options
    }

    fn waiter_secs(&self, secs: f64) -> Waiter {
        Waiter::with_options(
            WaitOptions::new()
                .with_timeout_secs(self.options.budget_secs(secs))
                .with_poll_interval(self.options.video.interval.as_millis() as u64),
        )
    }

    fn apply_bandwidth(&self) -> ReproducirResult<()> {
        if let Some(limit) = self.options.bandwidth {
            tracing::info!(kbps = limit.downstream_kbps, "applying bandwidth cap");
            self.session.set_bandwidth(Some(limit))?;
        }
        Ok(())
    }

    /// Run the given kind of scenario for every URL, sequentially
    pub fn run_manifest(&self, urls: &[String], kind: ScenarioKind) -> SuiteReport {
        let start = Instant::now();
        let mut reports = Vec::with_capacity(urls.len());
        for url in urls {
            tracing::info!(%url, %kind, "running scenario");
            let report = match kind {
                ScenarioKind::Video => self.run_video(url),
                ScenarioKind::Player => self.run_player(url),
                ScenarioKind::MediaSourceCheck => self.run_media_source_check(url),
            };
            match &report.error {
                Some(error) => tracing::warn!(%url, %error, "scenario failed"),
                None => tracing::info!(%url, "scenario passed"),
            }
            reports.push(report);
        }
        SuiteReport {
            reports,
            duration: start.elapsed(),
        }
    }

    /// Full playback of a plain `<video>` element
    pub fn run_video(&self, url: &str) -> ScenarioReport {
        let start = Instant::now();
        self.classify(url, ScenarioKind::Video, start, self.video_scenario(url))
    }

    /// Full playback through an embedded ad-bearing player
    pub fn run_player(&self, url: &str) -> ScenarioReport {
        let start = Instant::now();
        self.classify(url, ScenarioKind::Player, start, self.player_scenario(url))
    }

    /// Check that the target video streams through media-source delivery
    pub fn run_media_source_check(&self, url: &str) -> ScenarioReport {
        let start = Instant::now();
        self.classify(
            url,
            ScenarioKind::MediaSourceCheck,
            start,
            self.media_source_scenario(url),
        )
    }

    fn video_scenario(&self, url: &str) -> ReproducirResult<()> {
        self.apply_bandwidth()?;
        let video = Html5Video::attach_with(&self.session, url, self.options.video.clone())?;

        self.waiter_secs(self.options.startup_timeout.as_secs_f64())
            .wait_until(&video, "playback started", |target| {
                Ok(playback_started(&target.snapshot()?))
            })?;

        let duration = video
            .duration()?
            .ok_or_else(|| ReproducirError::Session {
                message: "media duration unavailable after playback start".to_string(),
            })?;
        let budget = duration * self.options.timeout_factor
            + self.options.video.stall_wait_time.as_secs_f64();

        // strict decode-pipeline checking needs the backend's debug channel;
        // probe once so backends without one still get the clock-based check
        let strict = video.debug_lines()?.is_some();
        self.waiter_secs(budget)
            .wait_until(&video, "playback done", |target| {
                let remaining = target.remaining_time()?;
                if strict {
                    let lines = target.debug_lines()?;
                    element_playback_done(remaining, lines.as_deref(), target)
                } else {
                    Ok(remaining.is_some_and(|r| r.abs() < ELEMENT_DONE_EPSILON_S))
                }
            })?;
        Ok(())
    }

    fn player_scenario(&self, url: &str) -> ReproducirResult<()> {
        self.apply_bandwidth()?;
        let player =
            EmbeddedPlayer::attach_with(&self.session, url, self.player_video_options())?;

        match player.deactivate_autoplay() {
            Ok(off) => tracing::debug!(autoplay_off = off, "autoplay toggle attempted"),
            Err(error) => tracing::warn!(%error, "autoplay toggle failed"),
        }

        self.waiter_secs(self.options.player_startup_timeout.as_secs_f64())
            .wait_until(&player, "playback started", |target| {
                Ok(playback_started(&target.snapshot()?))
            })?;

        let time_left = self
            .coordinator
            .wait_for_almost_done(&player, self.options.final_piece)?;

        let duration = player.player_duration()?.abs() + 1.0;
        if duration > 1.0 {
            tracing::info!(time_left, "almost done");
            if time_left > self.options.final_piece {
                tracing::warn!(
                    time_left,
                    final_piece = self.options.final_piece,
                    "more time left than the final piece"
                );
            }
        } else {
            tracing::warn!(%player, "duration close to 0");
        }

        let budget = time_left.max(100.0) * self.options.timeout_factor;
        self.waiter_secs(budget)
            .wait_until(&player, "playback done", |target| {
                self.coordinator.playback_done(target)
            })?;
        Ok(())
    }

    fn media_source_scenario(&self, url: &str) -> ReproducirResult<()> {
        self.apply_bandwidth()?;
        let player =
            EmbeddedPlayer::attach_with(&self.session, url, self.player_video_options())?;

        // src is sometimes null during ad playback, and many ads do not use
        // media-source delivery even when the main video does; get the
        // initial ad out of the way before asserting on src
        self.coordinator.attempt_skip(&player)?;

        let budget = (player.player_duration()? * self.options.timeout_factor).min(300.0);
        self.waiter_secs(budget)
            .wait_until(&player, "media-source src", |target| {
                Ok(target
                    .video_src()?
                    .is_some_and(|src| src.starts_with(MEDIA_SOURCE_PREFIX)))
            })?;
        Ok(())
    }

    fn player_video_options(&self) -> VideoOptions {
        let mut options = self.options.video.clone();
        if let Selector::Tag(_) = options.selector {
            options.selector = Selector::css(PLAYER_VIDEO_SELECTOR);
        }
        options
    }

    fn classify(
        &self,
        url: &str,
        kind: ScenarioKind,
        start: Instant,
        result: ReproducirResult<()>,
    ) -> ScenarioReport {
        match result {
            Ok(()) => ScenarioReport {
                url: url.to_string(),
                kind,
                status: ScenarioStatus::Passed,
                error: None,
                duration: start.elapsed(),
                artifacts: None,
            },
            Err(error) => {
                let status = ScenarioStatus::from_error(&error);
                let artifacts = self.capture_artifacts();
                ScenarioReport {
                    url: url.to_string(),
                    kind,
                    status,
                    error: Some(error.to_string()),
                    duration: start.elapsed(),
                    artifacts: Some(artifacts),
                }
            }
        }
    }

    fn capture_artifacts(&self) -> FailureArtifacts {
        let screenshot = match self.session.screenshot() {
            Ok(png) => Some(png),
            Err(error) => {
                tracing::warn!(%error, "failure screenshot capture failed");
                None
            }
        };
        let debug_dump = decoder_debug_dump(&self.session)
            .ok()
            .flatten()
            .map(|lines| lines.join("\n"));
        FailureArtifacts {
            screenshot,
            debug_dump,
            captured_at: SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockSession};
    use crate::player::PLAYER_ELEMENT_ID;
    use serde_json::Value;
    use std::cell::Cell;
    use std::rc::Rc;

    fn fast_options() -> ScenarioOptions {
        let mut options = ScenarioOptions::new().with_startup_timeout(
            Duration::from_millis(100),
            Duration::from_millis(100),
        );
        options.video = VideoOptions::new()
            .with_interval(Duration::ZERO)
            .with_attach_timeout(Duration::from_millis(50))
            .with_stall_wait_time(Duration::ZERO);
        options
    }

    fn fast_coordinator() -> AdSkipCoordinator {
        AdSkipCoordinator::new()
            .with_render_grace(Duration::ZERO)
            .with_retry_pause(Duration::ZERO)
            .with_ad_end_slack(0.0)
            .with_base_rest(0.0)
    }

    mod classification_tests {
        use super::*;

        #[test]
        fn statuses_map_from_the_error_taxonomy() {
            let timeout = ReproducirError::Timeout {
                condition: "c".to_string(),
                ms: 1,
                target: "t".to_string(),
            };
            let stall = ReproducirError::Stall {
                target: "t".to_string(),
            };
            let inconsistency = ReproducirError::Inconsistency {
                message: "m".to_string(),
            };
            let session = ReproducirError::Session {
                message: "m".to_string(),
            };
            assert_eq!(
                ScenarioStatus::from_error(&timeout),
                ScenarioStatus::TimedOut
            );
            assert_eq!(ScenarioStatus::from_error(&stall), ScenarioStatus::Stalled);
            assert_eq!(
                ScenarioStatus::from_error(&inconsistency),
                ScenarioStatus::Inconsistent
            );
            assert_eq!(
                ScenarioStatus::from_error(&session),
                ScenarioStatus::SessionFailed
            );
        }

        #[test]
        fn kind_display_names() {
            assert_eq!(ScenarioKind::Video.to_string(), "video-playback");
            assert_eq!(ScenarioKind::Player.to_string(), "player-playback");
            assert_eq!(
                ScenarioKind::MediaSourceCheck.to_string(),
                "media-source-check"
            );
        }
    }

    mod video_scenario_tests {
        use super::*;

        fn ticking_video_session() -> MockSession {
            // currentTime advances 2s per read; duration 5s; no dump needed
            // because the near-end epsilon is reached quickly
            let tick = Rc::new(Cell::new(0.0_f64));
            MockSession::new()
                .with_element(&Selector::tag("video"), MockElement::displayed())
                .on_script(move |_, script| {
                    if script.contains("currentTime") {
                        let now = tick.get();
                        tick.set((now + 2.0).min(5.0));
                        Ok(serde_json::json!(now))
                    } else if script.contains("duration") {
                        Ok(serde_json::json!(5.0))
                    } else {
                        Ok(Value::Null)
                    }
                })
        }

        #[test]
        fn full_playback_passes() {
            let runner =
                PlaybackRunner::new(ticking_video_session()).with_options(fast_options());
            let report = runner.run_video("https://example.test/v");
            assert!(report.is_passed(), "error: {:?}", report.error);
            assert!(report.artifacts.is_none());
        }

        #[test]
        fn missing_element_times_out_with_artifacts() {
            let runner = PlaybackRunner::new(MockSession::new()).with_options(fast_options());
            let report = runner.run_video("https://example.test/none");
            assert_eq!(report.status, ScenarioStatus::TimedOut);
            let artifacts = report.artifacts.expect("artifacts captured on failure");
            assert!(artifacts.screenshot.is_some());
        }

        #[test]
        fn bandwidth_cap_is_applied_before_the_scenario() {
            let session = ticking_video_session();
            let options = fast_options().with_bandwidth(BandwidthLimit::downstream(160));
            let runner = PlaybackRunner::new(session).with_options(options);
            let report = runner.run_video("https://example.test/v");
            assert!(report.is_passed());
            assert_eq!(
                runner.session().bandwidth(),
                Some(BandwidthLimit::downstream(160))
            );
        }

        #[test]
        fn decoder_inconsistency_is_terminal() {
            // clock frozen far from the end, chrome dump shows one active
            // reader: the done predicate must raise, not time out
            let session = MockSession::new()
                .with_element(&Selector::tag("video"), MockElement::displayed())
                .on_script(|context, script| {
                    if context == crate::session::ScriptContext::Chrome {
                        Ok(serde_json::json!([
                            "Reader 0: active=true size=1",
                            "Reader 1: active=false size=2"
                        ]))
                    } else if script.contains("currentTime") {
                        Ok(serde_json::json!(10.0))
                    } else if script.contains("duration") {
                        Ok(serde_json::json!(120.0))
                    } else {
                        Ok(Value::Null)
                    }
                });
            let runner = PlaybackRunner::new(session).with_options(fast_options());
            let report = runner.run_video("https://example.test/v");
            assert_eq!(report.status, ScenarioStatus::Inconsistent);
        }
    }

    mod player_scenario_tests {
        use super::*;

        fn short_player_session() -> MockSession {
            // 30s target video, no ads; the player reports ENDED after a
            // handful of state reads
            let state_reads = Rc::new(Cell::new(0u32));
            MockSession::new()
                .with_element(
                    &Selector::css(PLAYER_VIDEO_SELECTOR),
                    MockElement::displayed(),
                )
                .with_element(&Selector::id(PLAYER_ELEMENT_ID), MockElement::displayed())
                .on_script(move |_, script| {
                    if script.contains("getPlayerState") {
                        let reads = state_reads.get() + 1;
                        state_reads.set(reads);
                        Ok(serde_json::json!(if reads > 6 { 0 } else { 1 }))
                    } else if script.contains("getAdState") {
                        Ok(serde_json::json!(0))
                    } else if script.contains("getDuration") {
                        Ok(serde_json::json!(30.0))
                    } else if script.contains("getCurrentTime") {
                        Ok(serde_json::json!(4.0))
                    } else {
                        Ok(Value::Null)
                    }
                })
        }

        #[test]
        fn short_ad_free_video_passes() {
            let runner = PlaybackRunner::new(short_player_session())
                .with_options(fast_options())
                .with_coordinator(fast_coordinator());
            let report = runner.run_player("https://example.test/watch?v=abc");
            assert!(report.is_passed(), "error: {:?}", report.error);
        }

        #[test]
        fn missing_player_widget_times_out() {
            let session = MockSession::new().with_element(
                &Selector::css(PLAYER_VIDEO_SELECTOR),
                MockElement::displayed(),
            );
            let runner = PlaybackRunner::new(session)
                .with_options(fast_options())
                .with_coordinator(fast_coordinator());
            let report = runner.run_player("https://example.test/watch?v=abc");
            assert_eq!(report.status, ScenarioStatus::TimedOut);
            assert!(report.error.unwrap().contains(PLAYER_ELEMENT_ID));
        }
    }

    mod media_source_tests {
        use super::*;

        fn mse_session(src: &'static str) -> MockSession {
            MockSession::new()
                .with_element(
                    &Selector::css(PLAYER_VIDEO_SELECTOR),
                    MockElement::displayed(),
                )
                .with_element(&Selector::id(PLAYER_ELEMENT_ID), MockElement::displayed())
                .on_script(move |_, script| {
                    if script.contains("getPlayerState") || script.contains("getAdState") {
                        Ok(serde_json::json!(1))
                    } else if script.contains("getDuration") {
                        Ok(serde_json::json!(60.0))
                    } else if script.contains("getCurrentTime") {
                        Ok(serde_json::json!(5.0))
                    } else if script.contains("currentSrc") {
                        Ok(serde_json::json!(src))
                    } else {
                        Ok(Value::Null)
                    }
                })
        }

        #[test]
        fn media_source_delivery_passes() {
            let runner = PlaybackRunner::new(mse_session("mediasource:blob:123"))
                .with_options(fast_options())
                .with_coordinator(fast_coordinator());
            let report = runner.run_media_source_check("https://example.test/watch?v=abc");
            assert!(report.is_passed(), "error: {:?}", report.error);
        }

        #[test]
        fn plain_http_delivery_times_out() {
            let mut options = fast_options();
            options.max_wait = Some(Duration::from_millis(50));
            let runner = PlaybackRunner::new(mse_session("https://cdn.example/video.mp4"))
                .with_options(options)
                .with_coordinator(fast_coordinator());
            let report = runner.run_media_source_check("https://example.test/watch?v=abc");
            assert_eq!(report.status, ScenarioStatus::TimedOut);
        }
    }

    mod suite_tests {
        use super::*;

        #[test]
        fn manifest_run_aggregates_reports() {
            let runner = PlaybackRunner::new(MockSession::new()).with_options(fast_options());
            let urls = vec![
                "https://example.test/a".to_string(),
                "https://example.test/b".to_string(),
            ];
            let suite = runner.run_manifest(&urls, ScenarioKind::Video);
            assert_eq!(suite.total(), 2);
            assert_eq!(suite.passed_count(), 0);
            assert_eq!(suite.failed_count(), 2);
            assert!(!suite.all_passed());
            assert_eq!(suite.failures().len(), 2);
        }

        #[test]
        fn suite_report_serializes_without_artifacts() {
            let report = ScenarioReport {
                url: "https://example.test/a".to_string(),
                kind: ScenarioKind::Video,
                status: ScenarioStatus::TimedOut,
                error: Some("timed out".to_string()),
                duration: Duration::from_secs(3),
                artifacts: Some(FailureArtifacts {
                    screenshot: Some(vec![1, 2, 3]),
                    debug_dump: None,
                    captured_at: SystemTime::now(),
                }),
            };
            let json = serde_json::to_string(&report).unwrap();
            assert!(json.contains("TimedOut"));
            assert!(!json.contains("screenshot"));
        }
    }
}
