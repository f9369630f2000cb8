//! Media targets: the playback handles a scenario drives.
//!
//! Two capability levels, kept as traits so higher layers never couple to a
//! concrete page structure:
//!
//! - [`MediaTarget`] is the bare `<video>` element capability.
//! - [`AdAwarePlayer`] extends it with the embedded player widget's API:
//!   player/ad state tracks, ad break counts, skip controls.
//!
//! [`Html5Video`] implements the first, [`EmbeddedPlayer`] both. All reads
//! are polling reads; nothing here subscribes to events.

use crate::result::{ReproducirError, ReproducirResult};
use crate::session::{pause_for, ElementRef, ScriptContext, Selector, Session};
use crate::state::{
    low_progress, PlaybackSnapshot, PlayerState, BUFFERING_GRACE_S, STALL_CONFIRM_DELAY_S,
};
use crate::wait::{WaitOptions, Waiter};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Id of the embedding player widget
pub const PLAYER_ELEMENT_ID: &str = "movie_player";

/// Selector of the media element inside the player widget
pub const PLAYER_VIDEO_SELECTOR: &str = "#movie_player video";

/// Selector of the ad skip control
pub const SKIP_CONTROL_SELECTOR: &str = "#movie_player .videoAdUiSkipContainer";

/// Selector of the ad countdown/attribution label
pub const AD_COUNTDOWN_SELECTOR: &str = "#movie_player .videoAdUiAttribution";

/// Id of the autoplay toggle
pub const AUTOPLAY_CHECKBOX_ID: &str = "autoplay-checkbox";

/// Privileged dump of per-decoder reader state, split into lines.
///
/// Only meaningful on backends exposing an internal media-source debug
/// channel; everywhere else it evaluates to the unavailable sentinel.
const DECODER_DUMP_SCRIPT: &str = "\
const media = document.getElementsByTagName('video');
for (const element of media) {
  const source = element.mozMediaSourceObject;
  if (source && source.mozDebugReaderData) {
    return source.mozDebugReaderData.split('\\n');
  }
}
return null;";

/// Read the backend's decoder debug dump directly off a session.
///
/// Used by the failure path, which may no longer hold a media target.
///
/// # Errors
///
/// Propagates session failures unchanged.
pub fn decoder_debug_dump<S: Session>(session: &S) -> ReproducirResult<Option<Vec<String>>> {
    let value = session.execute(ScriptContext::Chrome, DECODER_DUMP_SCRIPT, &[])?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value::<Vec<String>>(value) {
        Ok(lines) => Ok(Some(lines)),
        Err(error) => {
            tracing::debug!(%error, "decoder dump had unexpected shape");
            Ok(None)
        }
    }
}

fn clock_unavailable() -> ReproducirError {
    ReproducirError::Session {
        message: "media clock unavailable while measuring progress".to_string(),
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn fmt_read<T: fmt::Display>(read: ReproducirResult<Option<T>>) -> String {
    match read {
        Ok(Some(value)) => value.to_string(),
        Ok(None) => "unavailable".to_string(),
        Err(_) => "unreadable".to_string(),
    }
}

// =============================================================================
// CAPABILITY TRAITS
// =============================================================================

/// The bare video-element capability.
///
/// Accessors yield `Ok(None)` once the element has vanished (navigation, ad
/// swap); genuine transport or script failures are errors. `Display` must
/// dump enough state to make a timeout triageable.
pub trait MediaTarget: fmt::Display {
    /// URL this target was navigated to
    fn url(&self) -> &str;

    /// Interval between polling reads
    fn poll_interval(&self) -> Duration;

    /// Duration in seconds
    fn duration(&self) -> ReproducirResult<Option<f64>>;

    /// Playback position in seconds
    fn current_time(&self) -> ReproducirResult<Option<f64>>;

    /// Seconds left on the element clock
    fn remaining_time(&self) -> ReproducirResult<Option<f64>> {
        Ok(match (self.duration()?, self.current_time()?) {
            (Some(duration), Some(current)) => Some(duration - current),
            _ => None,
        })
    }

    /// Clock motion over one poll interval.
    ///
    /// # Errors
    ///
    /// Fails if the clock is unavailable on either read; mid-measurement is
    /// not the attach race, so a vanished element is a real problem here.
    fn measure_progress(&self) -> ReproducirResult<f64> {
        let initial = self.current_time()?.ok_or_else(clock_unavailable)?;
        pause_for(self.poll_interval());
        let now = self.current_time()?.ok_or_else(clock_unavailable)?;
        Ok(now - initial)
    }

    /// Start playback
    fn play(&self) -> ReproducirResult<()>;

    /// Pause playback
    fn pause(&self) -> ReproducirResult<()>;

    /// Source URL of the media element
    fn video_src(&self) -> ReproducirResult<Option<String>>;

    /// Internal decoder dump, where the backend has one
    fn debug_lines(&self) -> ReproducirResult<Option<Vec<String>>>;

    /// Fresh point-in-time state read
    fn snapshot(&self) -> ReproducirResult<PlaybackSnapshot> {
        Ok(PlaybackSnapshot {
            current_time: self.current_time()?,
            duration: self.duration()?,
            player_state: None,
            ad_state: None,
            video_src: self.video_src()?,
            progress_delta: None,
        })
    }

    /// Snapshot plus a progress measurement over one poll interval
    ///
    /// # Errors
    ///
    /// As [`measure_progress`](MediaTarget::measure_progress).
    fn snapshot_with_progress(&self) -> ReproducirResult<PlaybackSnapshot> {
        let mut snapshot = self.snapshot()?;
        snapshot.progress_delta = Some(self.measure_progress()?);
        Ok(snapshot)
    }
}

/// The ad-bearing player capability.
///
/// All `player_*` reads describe the *target* video via the player widget
/// API. They do not describe the media element, which may have an ad playing
/// in it; during an ad the element clock stands still and must not be used
/// for progress or remaining-time decisions.
pub trait AdAwarePlayer: MediaTarget {
    /// Main player state track
    fn player_state(&self) -> ReproducirResult<PlayerState>;

    /// Parallel ad state track
    fn ad_state(&self) -> ReproducirResult<PlayerState>;

    /// Target-video duration via the player API
    fn player_duration(&self) -> ReproducirResult<f64>;

    /// Target-video position via the player API
    fn player_current_time(&self) -> ReproducirResult<f64>;

    /// Target-video seconds left via the player API
    fn player_remaining_time(&self) -> ReproducirResult<f64> {
        Ok(self.player_duration()? - self.player_current_time()?)
    }

    /// Target-video clock motion over one poll interval
    fn player_measure_progress(&self) -> ReproducirResult<f64> {
        let initial = self.player_current_time()?;
        pause_for(self.poll_interval());
        Ok(self.player_current_time()? - initial)
    }

    /// Number of upcoming ad breaks (0 when the video carries no ads)
    fn breaks_count(&self) -> ReproducirResult<u32>;

    /// Whether the current ad offers a skip control
    fn ad_skippable(&self) -> ReproducirResult<bool>;

    /// Text of the on-screen ad countdown label, waiting up to `timeout`
    /// for it to appear; `None` when it never does
    fn ad_countdown_text(&self, timeout: Duration) -> ReproducirResult<Option<String>>;

    /// Wait for the skip control to render and click it
    ///
    /// # Errors
    ///
    /// Times out (with target dump) if the control never becomes visible.
    fn click_skip_control(&self, timeout: Duration) -> ReproducirResult<()>;

    /// Try to turn autoplay off; `true` when it ends up off
    fn deactivate_autoplay(&self) -> ReproducirResult<bool>;

    /// Delay before re-confirming a suspected stall
    fn stall_confirm_delay(&self) -> Duration {
        Duration::from_secs(STALL_CONFIRM_DELAY_S)
    }

    /// Extra confirmation grace while buffering
    fn buffering_grace(&self) -> Duration {
        Duration::from_secs(BUFFERING_GRACE_S)
    }

    /// Whether the player reports the target video playing
    fn player_playing(&self) -> ReproducirResult<bool> {
        Ok(self.player_state()? == PlayerState::Playing)
    }

    /// Whether the player reports buffering
    fn player_buffering(&self) -> ReproducirResult<bool> {
        Ok(self.player_state()? == PlayerState::Buffering)
    }

    /// Whether the target video ended
    fn player_ended(&self) -> ReproducirResult<bool> {
        Ok(self.player_state()? == PlayerState::Ended)
    }

    /// Whether an ad is playing right now
    fn ad_playing(&self) -> ReproducirResult<bool> {
        Ok(self.ad_state()? == PlayerState::Playing)
    }

    /// Whether the ad track reached its end state
    fn ad_ended(&self) -> ReproducirResult<bool> {
        Ok(self.ad_state()? == PlayerState::Ended)
    }

    /// Whether no ad is interfering with the target video.
    ///
    /// The ad-state read lags the UI at times, so once the target clock is
    /// moving, forward progress is accepted as proof by itself.
    fn ad_inactive(&self) -> ReproducirResult<bool> {
        if self.player_current_time()? > 0.0 || self.player_playing()? {
            Ok(self.player_measure_progress()? > 0.0 || self.ad_ended()?)
        } else {
            self.ad_ended()
        }
    }

    /// Two-phase stall verdict.
    ///
    /// Suspicion requires, in one tick: no ad playing, low progress on both
    /// the element and player clocks, and a playing-or-buffering state
    /// (paused is legitimate rest). The verdict only lands if the same
    /// condition still holds after [`stall_confirm_delay`] (plus
    /// [`buffering_grace`] when buffering), so a single slow tick never
    /// condemns a run.
    ///
    /// [`stall_confirm_delay`]: AdAwarePlayer::stall_confirm_delay
    /// [`buffering_grace`]: AdAwarePlayer::buffering_grace
    fn player_stalled(&self) -> ReproducirResult<bool> {
        fn suspected<P: AdAwarePlayer + ?Sized>(player: &P) -> ReproducirResult<bool> {
            Ok(!player.ad_playing()?
                && low_progress(player.measure_progress()?)
                && low_progress(player.player_measure_progress()?)
                && matches!(
                    player.player_state()?,
                    PlayerState::Playing | PlayerState::Buffering
                ))
        }

        if !suspected(self)? {
            return Ok(false);
        }
        pause_for(self.stall_confirm_delay());
        if self.player_buffering()? {
            pause_for(self.buffering_grace());
        }
        suspected(self)
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Construction options for media targets
#[derive(Debug, Clone)]
pub struct VideoOptions {
    /// Selector of the media element
    pub selector: Selector,
    /// Polling interval for clock reads
    pub interval: Duration,
    /// Cap on the effective duration, for partial-playback runs
    pub set_duration: Option<f64>,
    /// Slack granted on top of the playback budget for transient stalls
    pub stall_wait_time: Duration,
    /// How long to wait for the element to attach after navigation
    pub attach_timeout: Duration,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            selector: Selector::tag("video"),
            interval: Duration::from_secs(1),
            set_duration: None,
            stall_wait_time: Duration::from_secs(10),
            attach_timeout: Duration::from_secs(30),
        }
    }
}

impl VideoOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the media-element selector
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Cap the effective duration (partial playback)
    #[must_use]
    pub const fn with_set_duration(mut self, seconds: f64) -> Self {
        self.set_duration = Some(seconds);
        self
    }

    /// Set the stall slack
    #[must_use]
    pub const fn with_stall_wait_time(mut self, slack: Duration) -> Self {
        self.stall_wait_time = slack;
        self
    }

    /// Set the attach timeout
    #[must_use]
    pub const fn with_attach_timeout(mut self, timeout: Duration) -> Self {
        self.attach_timeout = timeout;
        self
    }

    fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.attach_timeout.as_millis() as u64)
            .with_poll_interval(self.interval.as_millis() as u64)
    }
}

// =============================================================================
// HTML5 VIDEO TARGET
// =============================================================================

/// Handle to a plain HTML5 `<video>` element on a page.
///
/// Attaching navigates and then waits for the element; a page that never
/// produces one fails with a verbose timeout.
pub struct Html5Video<'s, S: Session> {
    session: &'s S,
    url: String,
    video: ElementRef,
    options: VideoOptions,
}

impl<'s, S: Session> Html5Video<'s, S> {
    /// Navigate to `url` and attach to the first `<video>` element
    ///
    /// # Errors
    ///
    /// Navigation failures, or a timeout if no element appears within the
    /// attach budget.
    pub fn attach(session: &'s S, url: &str) -> ReproducirResult<Self> {
        Self::attach_with(session, url, VideoOptions::default())
    }

    /// Navigate and attach with explicit options
    ///
    /// # Errors
    ///
    /// As [`Html5Video::attach`].
    pub fn attach_with(
        session: &'s S,
        url: &str,
        options: VideoOptions,
    ) -> ReproducirResult<Self> {
        session.navigate(url)?;
        let description = format!("media element ({}) at {url}", options.selector);
        let waiter = Waiter::with_options(options.wait_options());
        waiter.wait_until(description.as_str(), "media element attached", |_| {
            session.element_present(&options.selector)
        })?;
        let video = session.find_element(&options.selector)?;
        tracing::debug!(url, selector = %options.selector, "attached to media element");
        Ok(Self {
            session,
            url: url.to_string(),
            video,
            options,
        })
    }

    /// The session this target drives
    #[must_use]
    pub const fn session(&self) -> &'s S {
        self.session
    }

    /// Handle to the media element
    #[must_use]
    pub const fn element(&self) -> &ElementRef {
        &self.video
    }

    /// The options this target was attached with
    #[must_use]
    pub const fn options(&self) -> &VideoOptions {
        &self.options
    }

    /// Run a content script with `args[0]` bound to the media element
    ///
    /// # Errors
    ///
    /// Propagates session failures unchanged.
    pub fn execute_video_script(&self, script: &str) -> ReproducirResult<Value> {
        self.session
            .execute(ScriptContext::Content, script, &[&self.video])
    }

    fn read_clock(&self, script: &str) -> ReproducirResult<Option<f64>> {
        let value = self.execute_video_script(script)?;
        Ok(value_to_f64(&value))
    }
}

impl<S: Session> MediaTarget for Html5Video<'_, S> {
    fn url(&self) -> &str {
        &self.url
    }

    fn poll_interval(&self) -> Duration {
        self.options.interval
    }

    fn duration(&self) -> ReproducirResult<Option<f64>> {
        let real = self.read_clock(
            "return Number.isFinite(args[0].duration) ? args[0].duration : null;",
        )?;
        Ok(real.map(|duration| match self.options.set_duration {
            Some(cap) if cap < duration => cap,
            _ => duration,
        }))
    }

    fn current_time(&self) -> ReproducirResult<Option<f64>> {
        self.read_clock("return args[0].currentTime ?? null;")
    }

    fn play(&self) -> ReproducirResult<()> {
        self.execute_video_script("args[0].play(); return null;")?;
        Ok(())
    }

    fn pause(&self) -> ReproducirResult<()> {
        self.execute_video_script("args[0].pause(); return null;")?;
        Ok(())
    }

    fn video_src(&self) -> ReproducirResult<Option<String>> {
        let value = self.execute_video_script(
            "return args[0].currentSrc || args[0].getAttribute('src') || null;",
        )?;
        Ok(value.as_str().map(ToString::to_string))
    }

    fn debug_lines(&self) -> ReproducirResult<Option<Vec<String>>> {
        decoder_debug_dump(self.session)
    }
}

impl<S: Session> fmt::Debug for Html5Video<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Html5Video")
            .field("url", &self.url)
            .field("selector", &self.options.selector)
            .finish_non_exhaustive()
    }
}

impl<S: Session> fmt::Display for Html5Video<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Html5Video {}: {{", self.url)?;
        writeln!(f, "\tcurrent_time: {},", fmt_read(self.current_time()))?;
        writeln!(f, "\tduration: {},", fmt_read(self.duration()))?;
        write!(f, "}}")
    }
}

// =============================================================================
// EMBEDDED (AD-BEARING) PLAYER TARGET
// =============================================================================

/// Handle to an embedded player widget and the media element inside it.
///
/// Composes an [`Html5Video`] (the element the ads play in) with the player
/// widget whose API describes the target video.
pub struct EmbeddedPlayer<'s, S: Session> {
    video: Html5Video<'s, S>,
    player: ElementRef,
}

impl<'s, S: Session> EmbeddedPlayer<'s, S> {
    /// Navigate to `url` and attach to the player widget and its video
    ///
    /// # Errors
    ///
    /// Navigation failures, or a timeout if either element never appears.
    pub fn attach(session: &'s S, url: &str) -> ReproducirResult<Self> {
        Self::attach_with(
            session,
            url,
            VideoOptions::default().with_selector(Selector::css(PLAYER_VIDEO_SELECTOR)),
        )
    }

    /// Navigate and attach with explicit options
    ///
    /// # Errors
    ///
    /// As [`EmbeddedPlayer::attach`].
    pub fn attach_with(
        session: &'s S,
        url: &str,
        options: VideoOptions,
    ) -> ReproducirResult<Self> {
        let video = Html5Video::attach_with(session, url, options)?;
        let player_selector = Selector::id(PLAYER_ELEMENT_ID);
        let description = format!("player widget ({player_selector}) at {url}");
        let waiter = Waiter::with_options(video.options().wait_options());
        waiter.wait_until(description.as_str(), "player widget attached", |_| {
            session.element_present(&player_selector)
        })?;
        let player = session.find_element(&player_selector)?;
        tracing::debug!(url, "player widget obtained");
        Ok(Self { video, player })
    }

    /// The underlying media element handle
    #[must_use]
    pub const fn video(&self) -> &Html5Video<'s, S> {
        &self.video
    }

    /// Run a content script with `args[0]` bound to the media element and
    /// `args[1]` to the player widget
    ///
    /// # Errors
    ///
    /// Propagates session failures unchanged.
    pub fn execute_player_script(&self, script: &str) -> ReproducirResult<Value> {
        self.video.session().execute(
            ScriptContext::Content,
            script,
            &[self.video.element(), &self.player],
        )
    }

    /// Start the target video through the player API
    ///
    /// # Errors
    ///
    /// Propagates session failures unchanged.
    pub fn player_play(&self) -> ReproducirResult<()> {
        self.execute_player_script("args[1].playVideo(); return null;")?;
        Ok(())
    }

    /// Pause the target video through the player API
    ///
    /// # Errors
    ///
    /// Propagates session failures unchanged.
    pub fn player_pause(&self) -> ReproducirResult<()> {
        self.execute_player_script("args[1].pauseVideo(); return null;")?;
        Ok(())
    }

    /// Playback quality label reported by the player
    ///
    /// # Errors
    ///
    /// Propagates session failures unchanged.
    pub fn playback_quality(&self) -> ReproducirResult<Option<String>> {
        let value = self.execute_player_script("return args[1].getPlaybackQuality() ?? null;")?;
        Ok(value.as_str().map(ToString::to_string))
    }

    /// Id of the target video
    ///
    /// # Errors
    ///
    /// Propagates session failures unchanged.
    pub fn movie_id(&self) -> ReproducirResult<Option<String>> {
        let value = self.execute_player_script(
            "const data = args[1].getVideoData(); return data ? (data.video_id ?? null) : null;",
        )?;
        Ok(value.as_str().map(ToString::to_string))
    }

    /// Title of the target video
    ///
    /// # Errors
    ///
    /// Propagates session failures unchanged.
    pub fn movie_title(&self) -> ReproducirResult<Option<String>> {
        let value = self.execute_player_script(
            "const data = args[1].getVideoData(); return data ? (data.title ?? null) : null;",
        )?;
        Ok(value.as_str().map(ToString::to_string))
    }

    /// Canonical URL of the target video
    ///
    /// # Errors
    ///
    /// Propagates session failures unchanged.
    pub fn player_url(&self) -> ReproducirResult<Option<String>> {
        let value = self.execute_player_script("return args[1].getVideoUrl() ?? null;")?;
        Ok(value.as_str().map(ToString::to_string))
    }

    /// The player's own debug dictionary, when it parses as JSON
    ///
    /// # Errors
    ///
    /// Propagates session failures unchanged.
    pub fn player_debug(&self) -> ReproducirResult<Option<Value>> {
        let value = self.execute_player_script("return args[1].getDebugText() ?? null;")?;
        match value {
            Value::String(text) => match serde_json::from_str(&text) {
                Ok(parsed) => Ok(Some(parsed)),
                Err(_) => {
                    tracing::debug!("error loading json: DebugText");
                    Ok(None)
                }
            },
            _ => Ok(None),
        }
    }

    fn read_state(&self, script: &str, what: &str) -> ReproducirResult<PlayerState> {
        let value = self.execute_player_script(script)?;
        match value.as_i64() {
            Some(code) => PlayerState::try_from_code(code),
            None => Err(ReproducirError::Session {
                message: format!("{what} unavailable"),
            }),
        }
    }

    fn read_player_clock(&self, script: &str, what: &str) -> ReproducirResult<f64> {
        let value = self.execute_player_script(script)?;
        value_to_f64(&value).ok_or_else(|| ReproducirError::Session {
            message: format!("{what} unavailable"),
        })
    }
}

impl<S: Session> MediaTarget for EmbeddedPlayer<'_, S> {
    fn url(&self) -> &str {
        self.video.url()
    }

    fn poll_interval(&self) -> Duration {
        self.video.poll_interval()
    }

    fn duration(&self) -> ReproducirResult<Option<f64>> {
        self.video.duration()
    }

    fn current_time(&self) -> ReproducirResult<Option<f64>> {
        self.video.current_time()
    }

    fn play(&self) -> ReproducirResult<()> {
        self.video.play()
    }

    fn pause(&self) -> ReproducirResult<()> {
        self.video.pause()
    }

    fn video_src(&self) -> ReproducirResult<Option<String>> {
        self.video.video_src()
    }

    fn debug_lines(&self) -> ReproducirResult<Option<Vec<String>>> {
        self.video.debug_lines()
    }

    // player-API clocks: the media element may be showing an ad
    fn snapshot(&self) -> ReproducirResult<PlaybackSnapshot> {
        Ok(PlaybackSnapshot {
            current_time: Some(self.player_current_time()?),
            duration: Some(self.player_duration()?),
            player_state: Some(self.player_state()?),
            ad_state: Some(self.ad_state()?),
            video_src: self.video.video_src()?,
            progress_delta: None,
        })
    }
}

impl<S: Session> AdAwarePlayer for EmbeddedPlayer<'_, S> {
    fn player_state(&self) -> ReproducirResult<PlayerState> {
        self.read_state("return args[1].getPlayerState() ?? null;", "player state")
    }

    fn ad_state(&self) -> ReproducirResult<PlayerState> {
        // sometimes lags the visible ad UI; callers confirm before acting
        self.read_state("return args[1].getAdState() ?? null;", "ad state")
    }

    fn player_duration(&self) -> ReproducirResult<f64> {
        self.read_player_clock("return args[1].getDuration() ?? null;", "player duration")
    }

    fn player_current_time(&self) -> ReproducirResult<f64> {
        self.read_player_clock(
            "return args[1].getCurrentTime() ?? null;",
            "player current time",
        )
    }

    fn breaks_count(&self) -> ReproducirResult<u32> {
        // null when the video carries no ads at all
        let value = self.execute_player_script(
            "const breaks = args[1].getOption('ad', 'breakscount'); return breaks ?? 0;",
        )?;
        Ok(value.as_f64().unwrap_or(0.0) as u32)
    }

    fn ad_skippable(&self) -> ReproducirResult<bool> {
        let value = self.execute_player_script(
            "const state = args[1].getOption('ad', 'displaystate'); \
             return state ? (state.skippable ?? false) : false;",
        )?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn ad_countdown_text(&self, timeout: Duration) -> ReproducirResult<Option<String>> {
        let selector = Selector::css(AD_COUNTDOWN_SELECTOR);
        let waiter = Waiter::with_options(
            WaitOptions::new()
                .with_timeout(timeout.as_millis() as u64)
                .with_poll_interval(self.poll_interval().as_millis() as u64),
        );
        match waiter.wait_until(self, "ad countdown label present", |target| {
            target.video.session().element_present(&selector)
        }) {
            Ok(_) => {}
            Err(ReproducirError::Timeout { .. }) => return Ok(None),
            Err(error) => return Err(error),
        }
        let label = self.video.session().find_element(&selector)?;
        self.video.session().element_text(&label)
    }

    fn click_skip_control(&self, timeout: Duration) -> ReproducirResult<()> {
        let selector = Selector::css(SKIP_CONTROL_SELECTOR);
        let waiter = Waiter::with_options(
            WaitOptions::new()
                .with_timeout(timeout.as_millis() as u64)
                .with_poll_interval(self.poll_interval().as_millis() as u64),
        );
        waiter.wait_until(self, "ad skip control displayed", |target| {
            target.video.session().element_displayed(&selector)
        })?;
        let control = self.video.session().find_element(&selector)?;
        self.video.session().click(&control)
    }

    fn deactivate_autoplay(&self) -> ReproducirResult<bool> {
        let selector = Selector::id(AUTOPLAY_CHECKBOX_ID);
        let toggle_budget = self
            .video
            .options()
            .attach_timeout
            .min(Duration::from_secs(10));
        let waiter = Waiter::with_options(
            WaitOptions::new()
                .with_timeout(toggle_budget.as_millis() as u64)
                .with_poll_interval(self.poll_interval().as_millis() as u64),
        );
        match waiter.wait_until(self, "autoplay toggle present", |target| {
            target.video.session().element_present(&selector)
        }) {
            Ok(_) => {}
            Err(ReproducirError::Timeout { .. }) => return Ok(false),
            Err(error) => return Err(error),
        }
        let checkbox = self.video.session().find_element(&selector)?;

        // late-loading sidebar ads re-render the toggle and reset the
        // preference; clicking too early lets it snap back moments later
        pause_for(self.poll_interval());

        let session = self.video.session();
        let checked = session
            .execute(
                ScriptContext::Content,
                "return args[0].checked ?? null;",
                &[&checkbox],
            )?
            .as_bool();
        if checked == Some(true) {
            session.execute(
                ScriptContext::Content,
                "args[0].click(); return null;",
                &[&checkbox],
            )?;
            tracing::info!("toggled autoplay");
        }
        let autoplay = session
            .execute(
                ScriptContext::Content,
                "return args[0].checked ?? null;",
                &[&checkbox],
            )?
            .as_bool();
        tracing::info!(?autoplay, "autoplay state");
        Ok(autoplay == Some(false))
    }
}

impl<S: Session> fmt::Debug for EmbeddedPlayer<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedPlayer")
            .field("video", &self.video)
            .field("player", &self.player)
            .finish()
    }
}

impl<S: Session> fmt::Display for EmbeddedPlayer<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.video)?;
        writeln!(f, "#{PLAYER_ELEMENT_ID}: {{")?;
        writeln!(f, "\tvideo id: {},", fmt_read(self.movie_id()))?;
        writeln!(f, "\tvideo_title: {},", fmt_read(self.movie_title()))?;
        writeln!(
            f,
            "\tcurrent_state: {},",
            fmt_read(self.player_state().map(Some))
        )?;
        writeln!(f, "\tad_state: {},", fmt_read(self.ad_state().map(Some)))?;
        writeln!(
            f,
            "\tplayback_quality: {},",
            fmt_read(self.playback_quality())
        )?;
        writeln!(
            f,
            "\tcurrent_time: {},",
            fmt_read(self.player_current_time().map(Some))
        )?;
        writeln!(
            f,
            "\tduration: {},",
            fmt_read(self.player_duration().map(Some))
        )?;
        write!(f, "}}")
    }
}
