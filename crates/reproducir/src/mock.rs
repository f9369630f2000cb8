//! Scriptable stand-ins for the remote session and the media targets.
//!
//! [`MockSession`] answers the [`Session`] trait from canned elements and a
//! script handler; [`ScriptedPlayer`] replays a frame-by-frame playback
//! timeline through the [`MediaTarget`]/[`AdAwarePlayer`] traits with all
//! sleeps collapsed to zero, so the real polling logic runs at test speed.

use crate::player::{AdAwarePlayer, MediaTarget};
use crate::result::{ReproducirError, ReproducirResult};
use crate::session::{BandwidthLimit, ElementRef, ScriptContext, Selector, Session};
use crate::state::{PlaybackSnapshot, PlayerState};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

// =============================================================================
// MOCK SESSION
// =============================================================================

/// A canned DOM element
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    /// Whether the element exists
    pub present: bool,
    /// Whether the element occupies layout space
    pub displayed: bool,
    /// Text content
    pub text: Option<String>,
}

impl MockElement {
    /// An element that exists but is not rendered
    #[must_use]
    pub const fn present() -> Self {
        Self {
            present: true,
            displayed: false,
            text: None,
        }
    }

    /// An element that exists and is rendered
    #[must_use]
    pub const fn displayed() -> Self {
        Self {
            present: true,
            displayed: true,
            text: None,
        }
    }

    /// Attach text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

type ScriptHandler = Box<dyn Fn(ScriptContext, &str) -> ReproducirResult<Value>>;

#[derive(Default)]
struct MockSessionState {
    navigations: Vec<String>,
    clicks: Vec<String>,
    elements: HashMap<String, MockElement>,
    scripts: Vec<String>,
    bandwidth: Option<BandwidthLimit>,
}

/// In-memory [`Session`] for unit tests.
///
/// Elements are registered up front; script results come from a handler
/// closure (defaulting to the JSON `null` unavailable sentinel, which is
/// what a vanished element looks like).
pub struct MockSession {
    state: RefCell<MockSessionState>,
    script_handler: ScriptHandler,
    screenshot_png: Vec<u8>,
}

impl fmt::Debug for MockSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSession")
            .field("navigations", &self.state.borrow().navigations)
            .finish_non_exhaustive()
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSession {
    /// Create an empty session: no elements, every script unavailable
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(MockSessionState::default()),
            script_handler: Box::new(|_, _| Ok(Value::Null)),
            screenshot_png: vec![0x89, b'P', b'N', b'G'],
        }
    }

    /// Register an element under `selector`
    #[must_use]
    pub fn with_element(self, selector: &Selector, element: MockElement) -> Self {
        self.state
            .borrow_mut()
            .elements
            .insert(selector.to_string(), element);
        self
    }

    /// Install the script handler
    #[must_use]
    pub fn on_script<F>(mut self, handler: F) -> Self
    where
        F: Fn(ScriptContext, &str) -> ReproducirResult<Value> + 'static,
    {
        self.script_handler = Box::new(handler);
        self
    }

    /// Add or update an element after construction
    pub fn put_element(&self, selector: &Selector, element: MockElement) {
        self.state
            .borrow_mut()
            .elements
            .insert(selector.to_string(), element);
    }

    /// URLs navigated to, in order
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.state.borrow().navigations.clone()
    }

    /// Selectors clicked, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.state.borrow().clicks.clone()
    }

    /// Scripts executed, in order
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        self.state.borrow().scripts.clone()
    }

    /// The bandwidth cap last applied
    #[must_use]
    pub fn bandwidth(&self) -> Option<BandwidthLimit> {
        self.state.borrow().bandwidth
    }

    fn element(&self, selector: &Selector) -> Option<MockElement> {
        self.state
            .borrow()
            .elements
            .get(&selector.to_string())
            .cloned()
    }
}

impl Session for MockSession {
    fn navigate(&self, url: &str) -> ReproducirResult<()> {
        self.state.borrow_mut().navigations.push(url.to_string());
        Ok(())
    }

    fn current_url(&self) -> ReproducirResult<String> {
        Ok(self
            .state
            .borrow()
            .navigations
            .last()
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    fn element_present(&self, selector: &Selector) -> ReproducirResult<bool> {
        Ok(self.element(selector).is_some_and(|el| el.present))
    }

    fn element_displayed(&self, selector: &Selector) -> ReproducirResult<bool> {
        Ok(self.element(selector).is_some_and(|el| el.displayed))
    }

    fn find_element(&self, selector: &Selector) -> ReproducirResult<ElementRef> {
        if self.element_present(selector)? {
            Ok(ElementRef::new(selector.clone()))
        } else {
            Err(ReproducirError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    fn element_text(&self, element: &ElementRef) -> ReproducirResult<Option<String>> {
        Ok(self.element(element.selector()).and_then(|el| el.text))
    }

    fn click(&self, element: &ElementRef) -> ReproducirResult<()> {
        self.state
            .borrow_mut()
            .clicks
            .push(element.selector().to_string());
        Ok(())
    }

    fn execute(
        &self,
        context: ScriptContext,
        script: &str,
        _args: &[&ElementRef],
    ) -> ReproducirResult<Value> {
        self.state.borrow_mut().scripts.push(script.to_string());
        (self.script_handler)(context, script)
    }

    fn screenshot(&self) -> ReproducirResult<Vec<u8>> {
        Ok(self.screenshot_png.clone())
    }

    fn set_bandwidth(&self, limit: Option<BandwidthLimit>) -> ReproducirResult<()> {
        self.state.borrow_mut().bandwidth = limit;
        Ok(())
    }
}

// =============================================================================
// SCRIPTED PLAYER
// =============================================================================

/// One tick of a scripted playback timeline
#[derive(Debug, Clone)]
pub struct PlayerFrame {
    /// Media-element clock (describes the ad during ad playback)
    pub element_time: f64,
    /// Media-element duration
    pub element_duration: f64,
    /// Target-video clock via the player API
    pub player_time: f64,
    /// Target-video duration via the player API
    pub player_duration: f64,
    /// Main state track
    pub player_state: PlayerState,
    /// Ad state track
    pub ad_state: PlayerState,
    /// Upcoming ad breaks
    pub breaks: u32,
    /// Whether the current ad offers a skip control
    pub skippable: bool,
    /// On-screen countdown label
    pub countdown: Option<String>,
    /// Media element source URL
    pub video_src: Option<String>,
    /// Decoder dump lines
    pub debug_lines: Option<Vec<String>>,
}

impl PlayerFrame {
    /// A playing frame at `player_time` out of `player_duration`
    #[must_use]
    pub fn playing(player_time: f64, player_duration: f64) -> Self {
        Self {
            element_time: player_time,
            element_duration: player_duration,
            player_time,
            player_duration,
            player_state: PlayerState::Playing,
            ad_state: PlayerState::Ended,
            breaks: 0,
            skippable: false,
            countdown: None,
            video_src: Some("mediasource:blob:0000".to_string()),
            debug_lines: None,
        }
    }

    /// Set the main state track
    #[must_use]
    pub const fn with_state(mut self, state: PlayerState) -> Self {
        self.player_state = state;
        self
    }

    /// Set the ad state track
    #[must_use]
    pub const fn with_ad_state(mut self, state: PlayerState) -> Self {
        self.ad_state = state;
        self
    }

    /// Set the upcoming break count
    #[must_use]
    pub const fn with_breaks(mut self, breaks: u32) -> Self {
        self.breaks = breaks;
        self
    }

    /// Mark the current ad skippable
    #[must_use]
    pub const fn with_skippable(mut self, skippable: bool) -> Self {
        self.skippable = skippable;
        self
    }

    /// Set the countdown label
    #[must_use]
    pub fn with_countdown(mut self, label: impl Into<String>) -> Self {
        self.countdown = Some(label.into());
        self
    }

    /// Set the media-element clock independently of the player clock
    #[must_use]
    pub const fn with_element_clock(mut self, time: f64, duration: f64) -> Self {
        self.element_time = time;
        self.element_duration = duration;
        self
    }

    /// Set the media element source
    #[must_use]
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.video_src = Some(src.into());
        self
    }
}

/// An [`AdAwarePlayer`] that replays a fixed frame timeline.
///
/// Each progress measurement advances to the next frame (the timeline *is*
/// the clock); state reads see the current frame. The final frame repeats
/// forever. Sleeps and grace periods are zero so stall confirmation runs
/// instantly while still exercising the two-phase logic.
pub struct ScriptedPlayer {
    url: String,
    frames: Vec<PlayerFrame>,
    index: Cell<usize>,
    skip_clicks: Cell<u32>,
}

impl fmt::Debug for ScriptedPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedPlayer")
            .field("frame", &self.index.get())
            .field("frames", &self.frames.len())
            .finish_non_exhaustive()
    }
}

impl ScriptedPlayer {
    /// Build a player from a non-empty timeline
    #[must_use]
    pub fn new(frames: Vec<PlayerFrame>) -> Self {
        assert!(!frames.is_empty(), "timeline needs at least one frame");
        Self {
            url: "https://example.test/scripted".to_string(),
            frames,
            index: Cell::new(0),
            skip_clicks: Cell::new(0),
        }
    }

    fn frame(&self) -> &PlayerFrame {
        &self.frames[self.index.get()]
    }

    fn advance(&self) {
        let next = self.index.get() + 1;
        if next < self.frames.len() {
            self.index.set(next);
        }
    }

    /// How many times the skip control was clicked
    #[must_use]
    pub fn skip_clicks(&self) -> u32 {
        self.skip_clicks.get()
    }

    /// Index of the frame currently shown
    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.index.get()
    }
}

impl fmt::Display for ScriptedPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.frame();
        write!(
            f,
            "scripted player frame {}/{}: state={} ad={} t={}/{}",
            self.index.get(),
            self.frames.len(),
            frame.player_state,
            frame.ad_state,
            frame.player_time,
            frame.player_duration
        )
    }
}

impl MediaTarget for ScriptedPlayer {
    fn url(&self) -> &str {
        &self.url
    }

    fn poll_interval(&self) -> Duration {
        Duration::ZERO
    }

    fn duration(&self) -> ReproducirResult<Option<f64>> {
        Ok(Some(self.frame().element_duration))
    }

    fn current_time(&self) -> ReproducirResult<Option<f64>> {
        Ok(Some(self.frame().element_time))
    }

    fn measure_progress(&self) -> ReproducirResult<f64> {
        let initial = self.frame().element_time;
        self.advance();
        Ok(self.frame().element_time - initial)
    }

    fn play(&self) -> ReproducirResult<()> {
        Ok(())
    }

    fn pause(&self) -> ReproducirResult<()> {
        Ok(())
    }

    fn video_src(&self) -> ReproducirResult<Option<String>> {
        Ok(self.frame().video_src.clone())
    }

    fn debug_lines(&self) -> ReproducirResult<Option<Vec<String>>> {
        Ok(self.frame().debug_lines.clone())
    }

    fn snapshot(&self) -> ReproducirResult<PlaybackSnapshot> {
        let frame = self.frame();
        Ok(PlaybackSnapshot {
            current_time: Some(frame.player_time),
            duration: Some(frame.player_duration),
            player_state: Some(frame.player_state),
            ad_state: Some(frame.ad_state),
            video_src: frame.video_src.clone(),
            progress_delta: None,
        })
    }
}

impl AdAwarePlayer for ScriptedPlayer {
    fn player_state(&self) -> ReproducirResult<PlayerState> {
        Ok(self.frame().player_state)
    }

    fn ad_state(&self) -> ReproducirResult<PlayerState> {
        Ok(self.frame().ad_state)
    }

    fn player_duration(&self) -> ReproducirResult<f64> {
        Ok(self.frame().player_duration)
    }

    fn player_current_time(&self) -> ReproducirResult<f64> {
        Ok(self.frame().player_time)
    }

    // a remaining-time read is how the ad loop observes wall-clock passing,
    // so it steps the timeline after answering from the current frame
    fn player_remaining_time(&self) -> ReproducirResult<f64> {
        let frame = self.frame();
        let remaining = frame.player_duration - frame.player_time;
        self.advance();
        Ok(remaining)
    }

    fn player_measure_progress(&self) -> ReproducirResult<f64> {
        let initial = self.frame().player_time;
        self.advance();
        Ok(self.frame().player_time - initial)
    }

    fn breaks_count(&self) -> ReproducirResult<u32> {
        Ok(self.frame().breaks)
    }

    fn ad_skippable(&self) -> ReproducirResult<bool> {
        Ok(self.frame().skippable)
    }

    fn ad_countdown_text(&self, _timeout: Duration) -> ReproducirResult<Option<String>> {
        Ok(self.frame().countdown.clone())
    }

    fn click_skip_control(&self, _timeout: Duration) -> ReproducirResult<()> {
        self.skip_clicks.set(self.skip_clicks.get() + 1);
        // skipping lands on the next scripted frame
        self.advance();
        Ok(())
    }

    fn deactivate_autoplay(&self) -> ReproducirResult<bool> {
        Ok(true)
    }

    fn stall_confirm_delay(&self) -> Duration {
        Duration::ZERO
    }

    fn buffering_grace(&self) -> Duration {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod mock_session_tests {
        use super::*;

        #[test]
        fn records_navigations_and_reports_current_url() {
            let session = MockSession::new();
            assert_eq!(session.current_url().unwrap(), "about:blank");
            session.navigate("https://example.test/a").unwrap();
            assert_eq!(session.current_url().unwrap(), "https://example.test/a");
        }

        #[test]
        fn unknown_elements_are_absent_not_errors() {
            let session = MockSession::new();
            assert!(!session.element_present(&Selector::tag("video")).unwrap());
            assert!(session.find_element(&Selector::tag("video")).is_err());
        }

        #[test]
        fn present_but_hidden_elements_are_not_displayed() {
            let selector = Selector::css(".skip");
            let session = MockSession::new().with_element(&selector, MockElement::present());
            assert!(session.element_present(&selector).unwrap());
            assert!(!session.element_displayed(&selector).unwrap());
        }

        #[test]
        fn default_script_result_is_the_unavailable_sentinel() {
            let session = MockSession::new();
            let value = session
                .execute(ScriptContext::Content, "return 1;", &[])
                .unwrap();
            assert!(value.is_null());
        }

        #[test]
        fn bandwidth_caps_are_recorded() {
            let session = MockSession::new();
            session
                .set_bandwidth(Some(BandwidthLimit::downstream(250)))
                .unwrap();
            assert_eq!(session.bandwidth(), Some(BandwidthLimit::downstream(250)));
            session.set_bandwidth(None).unwrap();
            assert_eq!(session.bandwidth(), None);
        }
    }

    mod scripted_player_tests {
        use super::*;

        #[test]
        fn timeline_advances_on_progress_measurement() {
            let player = ScriptedPlayer::new(vec![
                PlayerFrame::playing(0.0, 100.0),
                PlayerFrame::playing(1.0, 100.0),
                PlayerFrame::playing(2.0, 100.0),
            ]);
            assert!((player.player_measure_progress().unwrap() - 1.0).abs() < f64::EPSILON);
            assert!((player.measure_progress().unwrap() - 1.0).abs() < f64::EPSILON);
            assert_eq!(player.frame_index(), 2);
        }

        #[test]
        fn final_frame_repeats() {
            let player = ScriptedPlayer::new(vec![PlayerFrame::playing(5.0, 10.0)]);
            assert!((player.player_measure_progress().unwrap()).abs() < f64::EPSILON);
            assert_eq!(player.player_current_time().unwrap(), 5.0);
        }

        #[test]
        fn snapshot_with_progress_fills_the_delta() {
            let player = ScriptedPlayer::new(vec![
                PlayerFrame::playing(3.0, 10.0),
                PlayerFrame::playing(4.5, 10.0),
            ]);
            let snapshot = player.snapshot_with_progress().unwrap();
            assert_eq!(snapshot.progress_delta, Some(1.5));
            assert_eq!(snapshot.current_time, Some(3.0));
        }

        #[test]
        fn skip_click_advances_and_counts() {
            let player = ScriptedPlayer::new(vec![
                PlayerFrame::playing(0.0, 100.0)
                    .with_ad_state(PlayerState::Playing)
                    .with_skippable(true),
                PlayerFrame::playing(0.5, 100.0),
            ]);
            player.click_skip_control(Duration::ZERO).unwrap();
            assert_eq!(player.skip_clicks(), 1);
            assert_eq!(player.ad_state().unwrap(), PlayerState::Ended);
        }
    }
}
