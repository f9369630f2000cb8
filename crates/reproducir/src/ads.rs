//! Ad-break traversal.
//!
//! [`AdSkipCoordinator`] shortens ad interruptions without breaking on
//! videos that carry no ads at all. Expected negative outcomes (no ad
//! playing, ad not skippable) are boolean results; raised errors are
//! reserved for real verdicts (an illegitimate stall) and transport
//! failures.
//!
//! Everything here depends only on the [`AdAwarePlayer`] capability, never
//! on a concrete page structure.

use crate::player::AdAwarePlayer;
use crate::result::{ReproducirError, ReproducirResult};
use crate::session::pause_for;
use crate::state::{parse_countdown, DONE_EPSILON_S};
use crate::wait::{WaitOptions, Waiter};
use std::time::Duration;

/// Videos longer than this get their ad-poll rest scaled up (seconds)
pub const LONG_VIDEO_THRESHOLD_S: f64 = 600.0;

/// Divisor turning a long video's duration into its rest interval
pub const REST_SCALE_DIVISOR: f64 = 50.0;

/// Rest between ad polls, before long-video scaling (seconds)
pub const DEFAULT_AD_POLL_REST_S: f64 = 10.0;

/// Grace the ad UI gets to render its skip control (seconds)
pub const SKIP_RENDER_GRACE_S: u64 = 10;

/// Threshold under which a trailing ad break is not worth chasing (seconds)
pub const TRAILING_BREAK_THRESHOLD_S: f64 = 30.0;

/// Rest between ad polls for a video of `duration` seconds.
///
/// Long videos are polled less often; there is no point checking a
/// two-hour stream every ten seconds.
#[must_use]
pub fn rest_interval(duration: f64, base_rest: f64) -> f64 {
    if duration > LONG_VIDEO_THRESHOLD_S {
        duration / REST_SCALE_DIVISOR
    } else {
        base_rest
    }
}

/// Drives ad-break traversal for one scenario.
///
/// All knobs default to the empirically tuned values; they are tunable, not
/// structural, and tests collapse the sleeps to zero.
#[derive(Debug, Clone)]
pub struct AdSkipCoordinator {
    /// Grace the ad UI gets to render a skip control
    pub render_grace: Duration,
    /// How long to wait for the skip control to become visible
    pub skip_control_timeout: Duration,
    /// How long to wait for the countdown label when estimating ad length
    pub countdown_timeout: Duration,
    /// Slack on top of an estimated ad duration when waiting it out (seconds)
    pub ad_end_slack: f64,
    /// Remaining time under which trailing breaks are left alone (seconds)
    pub trailing_threshold: f64,
    /// Rest between ad polls before long-video scaling (seconds)
    pub base_rest: f64,
    /// Attempts at skipping the initial ad to obtain a real duration
    pub startup_retries: u32,
    /// Pause between those attempts
    pub retry_pause: Duration,
}

impl Default for AdSkipCoordinator {
    fn default() -> Self {
        Self {
            render_grace: Duration::from_secs(SKIP_RENDER_GRACE_S),
            skip_control_timeout: Duration::from_secs(30),
            countdown_timeout: Duration::from_secs(5),
            ad_end_slack: 5.0,
            trailing_threshold: TRAILING_BREAK_THRESHOLD_S,
            base_rest: DEFAULT_AD_POLL_REST_S,
            startup_retries: 5,
            retry_pause: Duration::from_secs(1),
        }
    }
}

impl AdSkipCoordinator {
    /// Create a coordinator with default knobs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the skip-control render grace
    #[must_use]
    pub const fn with_render_grace(mut self, grace: Duration) -> Self {
        self.render_grace = grace;
        self
    }

    /// Set the countdown-label wait
    #[must_use]
    pub const fn with_countdown_timeout(mut self, timeout: Duration) -> Self {
        self.countdown_timeout = timeout;
        self
    }

    /// Set the slack added to estimated ad durations
    #[must_use]
    pub const fn with_ad_end_slack(mut self, slack: f64) -> Self {
        self.ad_end_slack = slack;
        self
    }

    /// Set the trailing-break threshold
    #[must_use]
    pub const fn with_trailing_threshold(mut self, threshold: f64) -> Self {
        self.trailing_threshold = threshold;
        self
    }

    /// Set the base rest between ad polls
    #[must_use]
    pub const fn with_base_rest(mut self, rest: f64) -> Self {
        self.base_rest = rest;
        self
    }

    /// Set the pause between initial-ad skip attempts
    #[must_use]
    pub const fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }

    /// Try to skip the current ad.
    ///
    /// Returns `Ok(false)` right away when nothing suggests an ad (ad track
    /// idle and the target clock moving). Otherwise grants the ad UI
    /// [`render_grace`](Self::render_grace) to produce a skip control, then
    /// clicks it if the ad is skippable.
    ///
    /// # Errors
    ///
    /// Transport failures, or a timeout if a skippable ad's control never
    /// becomes visible.
    pub fn attempt_skip<P: AdAwarePlayer + ?Sized>(&self, player: &P) -> ReproducirResult<bool> {
        if player.ad_playing()? || player.player_measure_progress()? == 0.0 {
            // ad needs time to load and render its skip control
            pause_for(self.render_grace);
        } else {
            return Ok(false);
        }
        if player.ad_skippable()? {
            player.click_skip_control(self.skip_control_timeout)?;
            tracing::info!("skipped ad");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Estimate the current ad's duration in seconds.
    ///
    /// Only meaningful while an ad is plausibly active; otherwise `None`.
    /// An ad streaming through the primary delivery mechanism reports its
    /// own duration on the media element; failing that, the on-screen
    /// countdown label is parsed.
    ///
    /// # Errors
    ///
    /// Transport failures only; absent or unparseable labels are `None`.
    pub fn search_ad_duration<P: AdAwarePlayer + ?Sized>(
        &self,
        player: &P,
    ) -> ReproducirResult<Option<f64>> {
        if !(player.ad_playing()? || player.player_measure_progress()? == 0.0) {
            return Ok(None);
        }
        if player.ad_playing()? {
            if let (Some(src), Some(duration)) = (player.video_src()?, player.duration()?) {
                if src.starts_with("mediasource") && duration > 0.0 {
                    return Ok(Some(duration));
                }
            }
        }
        match player.ad_countdown_text(self.countdown_timeout)? {
            Some(label) => Ok(parse_countdown(&label).map(f64::from)),
            None => Ok(None),
        }
    }

    /// Completion check that also shoulders trailing ads.
    ///
    /// When an ad is playing at the end of the video the target's remaining
    /// time decides doneness, and a skip is attempted on the way out so the
    /// run does not idle through a closing ad.
    ///
    /// # Errors
    ///
    /// Transport failures, or a skip-control timeout.
    pub fn playback_done<P: AdAwarePlayer + ?Sized>(&self, player: &P) -> ReproducirResult<bool> {
        let mut target_remaining = None;
        if player.ad_playing()? {
            target_remaining = Some(player.player_remaining_time()?);
            self.attempt_skip(player)?;
        }
        Ok(player.player_ended()?
            || target_remaining.is_some_and(|remaining| remaining < DONE_EPSILON_S))
    }

    /// Let the video play until only `final_piece` seconds remain, skipping
    /// ads along the way as much as possible.
    ///
    /// `final_piece` should be short enough to be unlikely to host another
    /// ad break. Returns the remaining time on exit.
    ///
    /// Per iteration: a confirmed stall with no buffering excuse is fatal; a
    /// stall while buffering breaks out and leaves the verdict to the
    /// completion wait that follows; an unskippable ad is waited out for its
    /// estimated duration plus slack, with a timeout there logged and
    /// tolerated (the skip logic catches the ad again on the next pass).
    ///
    /// # Errors
    ///
    /// [`ReproducirError::Stall`] on a confirmed illegitimate stall;
    /// transport failures unchanged.
    pub fn wait_for_almost_done<P: AdAwarePlayer + ?Sized>(
        &self,
        player: &P,
        final_piece: f64,
    ) -> ReproducirResult<f64> {
        // a trailing break this close to the end is not worth chasing
        let mut remaining = player.player_remaining_time()?;
        if remaining > 0.0 && remaining <= final_piece {
            return Ok(remaining);
        }

        // The player duration is the authority here: the element duration
        // may describe an ad. It can still read 0 while an initial ad
        // plays, so skip and retry until a trustworthy value shows up.
        let mut duration = 0.0;
        for _ in 0..self.startup_retries {
            self.attempt_skip(player)?;
            duration = player.player_duration()?;
            if duration > 5.0 && !player.ad_playing()? {
                break;
            }
            pause_for(self.retry_pause);
        }
        remaining = duration;
        if duration < final_piece {
            // video is short, don't bother with ad chasing
            return Ok(duration);
        }
        let rest = rest_interval(duration, self.base_rest);

        while remaining > final_piece {
            if player.player_stalled()? {
                if player.player_buffering()? {
                    // slow network rather than a verdict; the completion
                    // wait after this loop owns the timeout
                    break;
                }
                return Err(ReproducirError::Stall {
                    target: player.to_string(),
                });
            }
            if player.breaks_count()? > 0 && !self.attempt_skip(player)? {
                // ad is either not playing or not skippable; wait it out
                if let Some(ad_duration) = self.search_ad_duration(player)? {
                    let waiter = Waiter::with_options(
                        WaitOptions::new()
                            .with_timeout_secs(ad_duration + self.ad_end_slack)
                            .with_poll_interval(player.poll_interval().as_millis() as u64),
                    );
                    match waiter.wait_until(player, "ad ended", |target| target.ad_ended()) {
                        Ok(_) => {}
                        Err(ReproducirError::Timeout { condition, ms, .. }) => {
                            tracing::warn!(%condition, ms, "waiting for ad to end timed out");
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
            if remaining > 1.5 * rest {
                pause_for(Duration::from_secs_f64(rest));
            } else {
                pause_for(Duration::from_secs_f64(rest / 2.0));
            }
            remaining = player.player_remaining_time()?;
        }
        Ok(remaining)
    }

    /// [`wait_for_almost_done`](Self::wait_for_almost_done) with the
    /// trailing-break threshold as the final piece
    ///
    /// # Errors
    ///
    /// As [`wait_for_almost_done`](Self::wait_for_almost_done).
    pub fn wait_for_ads<P: AdAwarePlayer + ?Sized>(&self, player: &P) -> ReproducirResult<f64> {
        self.wait_for_almost_done(player, self.trailing_threshold)
    }
}
