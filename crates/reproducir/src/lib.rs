//! Reproducir: media playback end-to-end testing over a remote-controlled
//! browser.
//!
//! Reproducir (Spanish: "to play back") drives a browser to load media, a
//! plain HTML5 `<video>` or an embedded ad-bearing player, waits for
//! playback to reach the states a scenario cares about (started, buffering,
//! ad playback, stalled, ended), and asserts correctness under whatever
//! network conditions the session imposes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     REPRODUCIR Architecture                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────────┐   ┌──────────────────┐   ┌────────────────┐  │
//! │  │ PlaybackRunner│──►│ AdSkipCoordinator│──►│ MediaTarget /  │  │
//! │  │ (scenarios)   │   │ + state machine  │   │ AdAwarePlayer  │  │
//! │  └───────┬───────┘   └────────┬─────────┘   └───────┬────────┘  │
//! │          │ waits              │ polls               │ reads     │
//! │  ┌───────▼───────┐   ┌────────▼─────────┐   ┌───────▼────────┐  │
//! │  │ Waiter        │   │ PlaybackSnapshot │   │ Session (CDP   │  │
//! │  │ (poll ticks)  │   │ predicates       │   │ or mock)       │  │
//! │  └───────────────┘   └──────────────────┘   └────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is single-threaded and poll-driven: waiting is cooperative
//! sleep-and-repoll against the one exclusively owned browser session, with
//! timeouts as the only cancellation.

#![warn(missing_docs)]

/// Ad-break traversal: skip attempts, duration estimation, wait loops
pub mod ads;

/// Browser configuration and the CDP-backed session (feature `browser`)
pub mod browser;

/// URL manifest loading
pub mod manifest;

/// Scriptable session and player stand-ins for tests
pub mod mock;

/// Media target capabilities and their page-level implementations
pub mod player;

mod result;

/// The remote-control session capability the core consumes
pub mod session;

/// Playback state model and phase predicates
pub mod state;

/// Scenario orchestration and suite reports
pub mod runner;

/// Bounded-retry polling
pub mod wait;

pub use ads::AdSkipCoordinator;
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::CdpSession;
pub use manifest::{load_manifest, parse_manifest};
pub use player::{AdAwarePlayer, EmbeddedPlayer, Html5Video, MediaTarget, VideoOptions};
pub use result::{ReproducirError, ReproducirResult};
pub use runner::{
    FailureArtifacts, PlaybackRunner, ScenarioKind, ScenarioOptions, ScenarioReport,
    ScenarioStatus, SuiteReport,
};
pub use session::{BandwidthLimit, ElementRef, ScriptContext, Selector, Session};
pub use state::{
    element_playback_done, parse_countdown, playback_done, playback_started, PlaybackSnapshot,
    PlayerState,
};
pub use wait::{WaitOptions, Waiter};
