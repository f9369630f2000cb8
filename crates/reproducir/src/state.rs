//! Playback state model and phase predicates.
//!
//! The remote player publishes its state as small integers; those codes are
//! its contract and are preserved bit-exactly here. On top of the raw codes
//! sit pure predicates over a per-tick [`PlaybackSnapshot`], the pieces of
//! the state machine that need no browser to test.

use crate::result::{ReproducirError, ReproducirResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Remaining time under which an ad-aware target counts as done (seconds)
pub const DONE_EPSILON_S: f64 = 1.0;

/// Remaining time under which a bare `<video>` element counts as done (seconds)
pub const ELEMENT_DONE_EPSILON_S: f64 = 2.0;

/// Progress per ~1s tick below which playback counts as not moving (seconds)
pub const STALL_PROGRESS_EPSILON_S: f64 = 0.1;

/// Delay before re-confirming a suspected stall (seconds)
pub const STALL_CONFIRM_DELAY_S: u64 = 2;

/// Extra confirmation grace while the player reports buffering (seconds)
pub const BUFFERING_GRACE_S: u64 = 5;

/// A healthy decode pipeline shows exactly this many active readers
/// (one audio decoder, one video decoder)
pub const ACTIVE_READERS_EXPECTED: usize = 2;

fn active_reader_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("active=true").unwrap())
}

fn countdown_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?P<minute>\d+):(?P<second>\d+)").unwrap())
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// State reported by the embedded player.
///
/// The integer codes are fixed by the external player's API and must not be
/// renumbered. The same code table is used for the parallel ad-state track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Player has not started the target video
    Unstarted,
    /// Target video finished
    Ended,
    /// Target video is playing
    Playing,
    /// Target video is paused
    Paused,
    /// Player is buffering
    Buffering,
    /// A video is cued but not started
    Cued,
}

impl PlayerState {
    /// Protocol code for this state
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }

    /// Decode a protocol code; unknown codes are `None`
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    /// Decode a protocol code, failing on values outside the table
    ///
    /// # Errors
    ///
    /// [`ReproducirError::UnknownPlayerState`] for codes the player never
    /// published.
    pub fn try_from_code(code: i64) -> ReproducirResult<Self> {
        Self::from_code(code).ok_or(ReproducirError::UnknownPlayerState { code })
    }

    /// Name as the player's API spells it
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "UNSTARTED",
            Self::Ended => "ENDED",
            Self::Playing => "PLAYING",
            Self::Paused => "PAUSED",
            Self::Buffering => "BUFFERING",
            Self::Cued => "CUED",
        }
    }

    /// All states, in protocol-code order
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Unstarted,
            Self::Ended,
            Self::Playing,
            Self::Paused,
            Self::Buffering,
            Self::Cued,
        ]
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One immutable read of playback/ad state at a point in time.
///
/// Taken fresh on every poll tick and discarded with it; nothing caches a
/// snapshot across ticks because the ad UI can mutate under us.
///
/// For ad-bearing targets `current_time`/`duration` come from the player
/// widget API, never the raw media element: while an ad plays, the
/// element's clock describes the ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Playback position in seconds, `None` once the element vanished
    pub current_time: Option<f64>,
    /// Total duration in seconds, `None` if unavailable
    pub duration: Option<f64>,
    /// Main player state track, `None` for bare `<video>` targets
    pub player_state: Option<PlayerState>,
    /// Parallel ad state track, `None` for bare `<video>` targets
    pub ad_state: Option<PlayerState>,
    /// Source URL of the media element
    pub video_src: Option<String>,
    /// Observed progress over the last ~1s tick, when measured
    pub progress_delta: Option<f64>,
}

impl PlaybackSnapshot {
    /// Seconds left, when both clocks are available
    #[must_use]
    pub fn remaining_time(&self) -> Option<f64> {
        match (self.duration, self.current_time) {
            (Some(duration), Some(current)) => Some(duration - current),
            _ => None,
        }
    }

    /// Whether the ad track reports an ad in flight
    #[must_use]
    pub fn ad_active(&self) -> bool {
        self.ad_state == Some(PlayerState::Playing)
    }
}

impl fmt::Display for PlaybackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Display>(value: Option<T>) -> String {
            value.map_or_else(|| "unavailable".to_string(), |v| v.to_string())
        }
        writeln!(f, "snapshot: {{")?;
        writeln!(f, "\tcurrent_time: {},", opt(self.current_time))?;
        writeln!(f, "\tduration: {},", opt(self.duration))?;
        writeln!(f, "\tplayer_state: {},", opt(self.player_state))?;
        writeln!(f, "\tad_state: {},", opt(self.ad_state))?;
        writeln!(f, "\tvideo_src: {},", opt(self.video_src.as_deref()))?;
        write!(f, "}}")
    }
}

// =============================================================================
// PHASE PREDICATES
// =============================================================================

/// Whether playback has started.
///
/// When a player state is available, started means exactly
/// `PLAYING` or `BUFFERING`. An ad is often buffering before the real
/// content begins, and that counts. Bare `<video>` targets have no state
/// track, so any forward motion of the clock is the signal.
#[must_use]
pub fn playback_started(snapshot: &PlaybackSnapshot) -> bool {
    match snapshot.player_state {
        Some(state) => matches!(state, PlayerState::Playing | PlayerState::Buffering),
        None => snapshot.current_time.is_some_and(|t| t > 0.0),
    }
}

/// Whether playback of the target video is done.
///
/// Done means the player reports `ENDED`, or the target-video clock is
/// within [`DONE_EPSILON_S`] of the end (strict `<`, tolerating float and
/// polling jitter). Because ad-aware snapshots carry player-API clocks, a
/// trailing ad does not hide an effectively-finished target video.
#[must_use]
pub fn playback_done(snapshot: &PlaybackSnapshot) -> bool {
    if snapshot.player_state == Some(PlayerState::Ended) {
        return true;
    }
    snapshot
        .remaining_time()
        .is_some_and(|remaining| remaining < DONE_EPSILON_S)
}

/// Done-check for the bare `<video>` variant, which has no player-state API.
///
/// Near the end (|remaining| < [`ELEMENT_DONE_EPSILON_S`]) the video counts
/// as done outright; past that point decoders may legitimately wind down
/// and the dump would misreport. Otherwise the decoder debug dump must show
/// exactly one active audio and one active video reader; any other count is
/// a corrupted or vanished decode pipeline and fails hard, because past this
/// point the video is either still decoding normally or broken.
///
/// # Errors
///
/// [`ReproducirError::Inconsistency`] when the dump is missing or the
/// active-reader count is off.
pub fn element_playback_done(
    remaining_time: Option<f64>,
    debug_lines: Option<&[String]>,
    target: &dyn fmt::Display,
) -> ReproducirResult<bool> {
    if let Some(remaining) = remaining_time {
        if remaining.abs() < ELEMENT_DONE_EPSILON_S {
            return Ok(true);
        }
    }

    if let Some(lines) = debug_lines {
        let joined = lines.join(" ");
        let active = active_reader_re().find_iter(&joined).count();
        if active == ACTIVE_READERS_EXPECTED {
            return Ok(false);
        }
    }

    Err(ReproducirError::Inconsistency {
        message: format!(
            "did not find exactly one audio and one video active reader - {target}"
        ),
    })
}

/// Whether a ~1s progress measurement counts as "not moving"
#[must_use]
pub fn low_progress(delta: f64) -> bool {
    delta < STALL_PROGRESS_EPSILON_S
}

/// Parse an on-screen `MM:SS` countdown label into whole seconds.
///
/// The pattern is searched anywhere in the text (labels carry prefixes like
/// `"Ad · 2:30"`). Returns `None` when nothing matches.
#[must_use]
pub fn parse_countdown(text: &str) -> Option<u32> {
    let captures = countdown_re().captures(text)?;
    let minutes: u32 = captures.name("minute")?.as_str().parse().ok()?;
    let seconds: u32 = captures.name("second")?.as_str().parse().ok()?;
    Some(minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot() -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_time: None,
            duration: None,
            player_state: None,
            ad_state: None,
            video_src: None,
            progress_delta: None,
        }
    }

    mod player_state_tests {
        use super::*;

        #[test]
        fn codes_are_bit_exact() {
            assert_eq!(PlayerState::Unstarted.code(), -1);
            assert_eq!(PlayerState::Ended.code(), 0);
            assert_eq!(PlayerState::Playing.code(), 1);
            assert_eq!(PlayerState::Paused.code(), 2);
            assert_eq!(PlayerState::Buffering.code(), 3);
            assert_eq!(PlayerState::Cued.code(), 5);
        }

        #[test]
        fn code_round_trip() {
            for state in PlayerState::all() {
                assert_eq!(PlayerState::from_code(state.code()), Some(state));
            }
        }

        #[test]
        fn code_four_is_not_a_state() {
            assert_eq!(PlayerState::from_code(4), None);
            let err = PlayerState::try_from_code(4).unwrap_err();
            assert!(matches!(
                err,
                ReproducirError::UnknownPlayerState { code: 4 }
            ));
        }

        #[test]
        fn names_match_the_player_api() {
            assert_eq!(PlayerState::Unstarted.to_string(), "UNSTARTED");
            assert_eq!(PlayerState::Cued.to_string(), "CUED");
        }
    }

    mod started_tests {
        use super::*;

        #[test]
        fn started_iff_playing_or_buffering() {
            for state in PlayerState::all() {
                let s = PlaybackSnapshot {
                    player_state: Some(state),
                    ..snapshot()
                };
                let expected =
                    matches!(state, PlayerState::Playing | PlayerState::Buffering);
                assert_eq!(playback_started(&s), expected, "state {state}");
            }
        }

        #[test]
        fn bare_video_starts_on_clock_motion() {
            let mut s = snapshot();
            assert!(!playback_started(&s));
            s.current_time = Some(0.0);
            assert!(!playback_started(&s));
            s.current_time = Some(0.04);
            assert!(playback_started(&s));
        }

        #[test]
        fn state_track_wins_over_clock_for_players() {
            // paused player with a nonzero clock has started in the past,
            // but is not in a started phase now
            let s = PlaybackSnapshot {
                player_state: Some(PlayerState::Paused),
                current_time: Some(42.0),
                ..snapshot()
            };
            assert!(!playback_started(&s));
        }
    }

    mod done_tests {
        use super::*;

        #[test]
        fn playing_mid_video_is_not_done() {
            let s = PlaybackSnapshot {
                player_state: Some(PlayerState::Playing),
                ad_state: Some(PlayerState::Ended),
                current_time: Some(5.0),
                duration: Some(120.0),
                ..snapshot()
            };
            assert!(playback_started(&s));
            assert!(!playback_done(&s));
        }

        #[test]
        fn ended_is_done_regardless_of_other_fields() {
            let s = PlaybackSnapshot {
                player_state: Some(PlayerState::Ended),
                ..snapshot()
            };
            assert!(playback_done(&s));
        }

        #[test]
        fn done_is_idempotent_for_terminal_state() {
            let s = PlaybackSnapshot {
                player_state: Some(PlayerState::Ended),
                current_time: Some(12.0),
                duration: Some(120.0),
                ..snapshot()
            };
            assert!(playback_done(&s));
            assert!(playback_done(&s));
        }

        #[test]
        fn done_boundary_is_strictly_below_one_second() {
            let mut s = PlaybackSnapshot {
                player_state: Some(PlayerState::Playing),
                current_time: Some(119.0),
                duration: Some(120.0),
                ..snapshot()
            };
            // remaining exactly 1.0: not done
            assert!(!playback_done(&s));
            s.current_time = Some(119.01);
            assert!(playback_done(&s));
        }

        #[test]
        fn trailing_ad_with_target_nearly_over_is_done() {
            let s = PlaybackSnapshot {
                player_state: Some(PlayerState::Playing),
                ad_state: Some(PlayerState::Playing),
                current_time: Some(119.5),
                duration: Some(120.0),
                ..snapshot()
            };
            assert!(s.ad_active());
            assert!(playback_done(&s));
        }

        #[test]
        fn missing_clocks_are_not_done() {
            let s = PlaybackSnapshot {
                player_state: Some(PlayerState::Playing),
                ..snapshot()
            };
            assert!(!playback_done(&s));
        }
    }

    mod element_done_tests {
        use super::*;

        fn dump(active: usize, inactive: usize) -> Vec<String> {
            let mut lines = vec!["Dumping data for reader 1a2b:".to_string()];
            for i in 0..active {
                lines.push(format!(
                    "  Reader {i}: ranges=[(0.0, 16.0)] active=true size=196456"
                ));
            }
            for i in 0..inactive {
                lines.push(format!(
                    "  Reader {i}: ranges=[(0.0, 4.0)] active=false size=242367"
                ));
            }
            lines
        }

        #[test]
        fn near_end_is_done_without_consulting_dump() {
            assert!(element_playback_done(Some(1.9), None, &"video").unwrap());
        }

        #[test]
        fn negative_remaining_counts_as_near_end() {
            assert!(element_playback_done(Some(-1.5), None, &"video").unwrap());
        }

        #[test]
        fn boundary_is_strictly_below_two_seconds() {
            // exactly 2.0 is not near-end; a healthy dump keeps it running
            let lines = dump(2, 3);
            assert!(!element_playback_done(Some(2.0), Some(&lines), &"video").unwrap());
        }

        #[test]
        fn two_active_readers_means_still_decoding() {
            let lines = dump(2, 2);
            assert!(!element_playback_done(Some(60.0), Some(&lines), &"video").unwrap());
        }

        #[test]
        fn three_active_readers_is_an_inconsistency() {
            let lines = dump(3, 0);
            let err = element_playback_done(Some(60.0), Some(&lines), &"video at x").unwrap_err();
            match err {
                ReproducirError::Inconsistency { message } => {
                    assert!(message.contains("video at x"));
                }
                other => panic!("expected Inconsistency, got {other:?}"),
            }
        }

        #[test]
        fn one_active_reader_is_an_inconsistency() {
            let lines = dump(1, 1);
            assert!(element_playback_done(Some(60.0), Some(&lines), &"video").is_err());
        }

        #[test]
        fn missing_dump_is_an_inconsistency() {
            let err = element_playback_done(Some(60.0), None, &"video").unwrap_err();
            assert!(matches!(err, ReproducirError::Inconsistency { .. }));
        }
    }

    mod progress_tests {
        use super::*;

        #[test]
        fn low_progress_boundary() {
            assert!(low_progress(0.0));
            assert!(low_progress(0.09));
            assert!(!low_progress(0.1));
            assert!(!low_progress(1.0));
        }
    }

    mod countdown_tests {
        use super::*;

        #[test]
        fn parses_minute_second_labels() {
            assert_eq!(parse_countdown("1:05"), Some(65));
            assert_eq!(parse_countdown("0:00"), Some(0));
            assert_eq!(parse_countdown("12:34"), Some(754));
        }

        #[test]
        fn finds_pattern_inside_decorated_labels() {
            assert_eq!(parse_countdown("Ad \u{b7} 2:30"), Some(150));
        }

        #[test]
        fn unparseable_text_is_none() {
            assert_eq!(parse_countdown("Visit advertiser"), None);
            assert_eq!(parse_countdown(""), None);
        }

        proptest! {
            #[test]
            fn round_trips_formatted_labels(minutes in 0u32..180, seconds in 0u32..60) {
                let label = format!("{minutes}:{seconds:02}");
                prop_assert_eq!(parse_countdown(&label), Some(minutes * 60 + seconds));
            }
        }
    }
}
