//! Result and error types for Reproducir.

use thiserror::Error;

/// Result type for Reproducir operations
pub type ReproducirResult<T> = Result<T, ReproducirError>;

/// Errors that can occur while driving a playback scenario
#[derive(Debug, Error)]
pub enum ReproducirError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Remote session failure (script execution, element lookup, transport)
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Element lookup found nothing
    #[error("No element matching {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// The remote player reported a state code outside its published table
    #[error("Unknown player state code {code}")]
    UnknownPlayerState {
        /// The offending integer code
        code: i64,
    },

    /// A wait condition never became true within budget.
    ///
    /// Carries the waited-for condition and the target's own state dump so a
    /// bare timeout is never the only thing a failed run leaves behind.
    #[error("Timed out after {ms}ms waiting for {condition}\n{target}")]
    Timeout {
        /// Description of the condition that was waited for
        condition: String,
        /// Timeout budget in milliseconds
        ms: u64,
        /// State dump of the wait target at timeout
        target: String,
    },

    /// Playback stopped progressing with no ad, pause, or buffering to excuse it
    #[error("Playback stalled\n{target}")]
    Stall {
        /// State dump of the stalled target
        target: String,
    },

    /// The decoder debug dump contradicts a healthy playback pipeline
    #[error("Inconsistent playback pipeline: {message}")]
    Inconsistency {
        /// What the dump looked like
        message: String,
    },

    /// Screenshot capture error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// URL manifest could not be read or parsed
    #[error("Manifest {path}: {message}")]
    Manifest {
        /// Manifest path
        path: String,
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReproducirError {
    /// Whether the caller may sensibly retry the scenario.
    ///
    /// Timeouts are budget exhaustion, not proof of breakage; stalls and
    /// pipeline inconsistencies are verdicts about the playback itself and
    /// must not be retried away.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_carries_condition_and_target() {
        let err = ReproducirError::Timeout {
            condition: "playback started".to_string(),
            ms: 30_000,
            target: "video at https://example.test/v1".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("30000ms"));
        assert!(text.contains("playback started"));
        assert!(text.contains("https://example.test/v1"));
    }

    #[test]
    fn only_timeouts_are_retryable() {
        let timeout = ReproducirError::Timeout {
            condition: "x".to_string(),
            ms: 1,
            target: "t".to_string(),
        };
        let stall = ReproducirError::Stall {
            target: "t".to_string(),
        };
        let inconsistency = ReproducirError::Inconsistency {
            message: "m".to_string(),
        };
        assert!(timeout.is_retryable());
        assert!(!stall.is_retryable());
        assert!(!inconsistency.is_retryable());
    }

    #[test]
    fn unknown_state_code_display() {
        let err = ReproducirError::UnknownPlayerState { code: 4 };
        assert_eq!(err.to_string(), "Unknown player state code 4");
    }
}
