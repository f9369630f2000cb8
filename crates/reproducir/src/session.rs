//! Remote-control session capability.
//!
//! The core never talks to a browser directly. Everything it needs from the
//! outside world is behind the [`Session`] trait: navigate, probe for DOM
//! elements, run a small fixed script vocabulary against them, click, take a
//! screenshot, shape bandwidth. Implementations:
//!
//! - [`crate::browser::CdpSession`] (feature `browser`) drives a real
//!   chromium over CDP,
//! - [`crate::mock::MockSession`] replays scripted answers for unit tests.

use crate::result::ReproducirResult;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Privilege level a script executes under.
///
/// `Content` is the page's own world. `Chrome` is the privileged context the
/// original remote protocol offered for internal diagnostics; backends that
/// have no such context report scripts there as unavailable rather than
/// failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptContext {
    /// Page JavaScript context
    Content,
    /// Privileged (browser-internal) context
    Chrome,
}

impl fmt::Display for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Chrome => write!(f, "chrome"),
        }
    }
}

/// Selector for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Element id (e.g. `movie_player`)
    Id(String),
    /// CSS selector (e.g. `#movie_player video`)
    Css(String),
    /// First element with the given tag name (e.g. `video`)
    Tag(String),
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a tag-name selector
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// JavaScript expression evaluating to the element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Id(id) => format!("document.getElementById({id:?})"),
            Self::Css(css) => format!("document.querySelector({css:?})"),
            Self::Tag(tag) => format!("(document.getElementsByTagName({tag:?})[0] ?? null)"),
        }
    }

    /// JavaScript expression evaluating to `true` iff the element exists
    #[must_use]
    pub fn to_present_query(&self) -> String {
        format!("({}) !== null", self.to_query())
    }

    /// JavaScript expression evaluating to `true` iff the element exists and
    /// occupies layout space
    #[must_use]
    pub fn to_displayed_query(&self) -> String {
        format!(
            "(() => {{ const el = {}; return el !== null && el.getClientRects().length > 0; }})()",
            self.to_query()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::Css(css) => write!(f, "css={css}"),
            Self::Tag(tag) => write!(f, "tag={tag}"),
        }
    }
}

/// Handle to a located DOM element.
///
/// Deliberately thin: the element may vanish between polls (navigation, ad
/// swap), so the handle records how to find it again rather than pinning a
/// node. Scripts receive handles re-resolved as `args[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    selector: Selector,
}

impl ElementRef {
    /// Create a handle from the selector that located it
    #[must_use]
    pub const fn new(selector: Selector) -> Self {
        Self { selector }
    }

    /// The selector this handle re-resolves through
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element[{}]", self.selector)
    }
}

/// Downstream bandwidth cap applied to the page under test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandwidthLimit {
    /// Downstream limit in kilobits per second
    pub downstream_kbps: u32,
}

impl BandwidthLimit {
    /// Create a downstream limit
    #[must_use]
    pub const fn downstream(kbps: u32) -> Self {
        Self {
            downstream_kbps: kbps,
        }
    }

    /// Limit expressed in bytes per second (CDP's unit)
    #[must_use]
    pub const fn bytes_per_second(&self) -> f64 {
        (self.downstream_kbps as u64 * 1000 / 8) as f64
    }
}

/// The remote-execution capability the core consumes.
///
/// One session drives one browser; a scenario assumes exclusive ownership of
/// it for its whole duration. All methods are blocking reads/commands; the
/// core is poll-driven and has no use for notifications.
///
/// Script convention: scripts are statements that `return` a JSON value and
/// refer to their element arguments as `args[0]`, `args[1]`, …. If any bound
/// element has vanished the script is not run and the call yields JSON
/// `null`, and the "unavailable" sentinel accessors translate to `None`.
/// Genuine script failures are errors, never sentinels.
pub trait Session {
    /// Navigate the page to `url`
    fn navigate(&self, url: &str) -> ReproducirResult<()>;

    /// URL the page is currently at
    fn current_url(&self) -> ReproducirResult<String>;

    /// Whether an element matching `selector` exists
    fn element_present(&self, selector: &Selector) -> ReproducirResult<bool>;

    /// Whether an element matching `selector` exists and is rendered
    fn element_displayed(&self, selector: &Selector) -> ReproducirResult<bool>;

    /// Locate an element, failing with
    /// [`ElementNotFound`](crate::ReproducirError::ElementNotFound) if absent
    fn find_element(&self, selector: &Selector) -> ReproducirResult<ElementRef>;

    /// Text content of an element, or `None` once it has vanished
    fn element_text(&self, element: &ElementRef) -> ReproducirResult<Option<String>>;

    /// Click an element
    fn click(&self, element: &ElementRef) -> ReproducirResult<()>;

    /// Execute `script` in `context` with `args` bound to element handles
    fn execute(
        &self,
        context: ScriptContext,
        script: &str,
        args: &[&ElementRef],
    ) -> ReproducirResult<Value>;

    /// Capture a PNG screenshot of the page
    fn screenshot(&self) -> ReproducirResult<Vec<u8>>;

    /// Apply (or clear) a bandwidth cap for subsequent traffic
    fn set_bandwidth(&self, limit: Option<BandwidthLimit>) -> ReproducirResult<()>;
}

/// Block in-place for `duration`.
///
/// All waiting in the core is cooperative sleep-and-repoll; this is the one
/// place that sleeps so scripted tests can spot misuse easily.
pub fn pause_for(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}
