//! Bounded-retry polling.
//!
//! Every "wait for X" in a playback scenario is a [`Waiter`] evaluating a
//! predicate once per tick until it holds or the budget runs out. A timeout
//! always carries the target's own state dump; a bare timeout with no
//! context is useless for triaging a flaky media run.

use crate::result::{ReproducirError, ReproducirResult};
use crate::session::pause_for;
use std::fmt::Display;
use std::time::{Duration, Instant};

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (1 second; media clocks move in seconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Options for wait operations
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set timeout from fractional seconds
    #[must_use]
    pub fn with_timeout_secs(self, secs: f64) -> Self {
        self.with_timeout((secs.max(0.0) * 1000.0) as u64)
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitOutcome {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Waiter for synchronization against a polled target
#[derive(Debug, Clone, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// The configured options
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Repeatedly evaluate `predicate(target)` until it returns `Ok(true)`.
    ///
    /// `condition` names the thing being waited for; it ends up in the
    /// timeout error together with `target`'s `Display` dump.
    ///
    /// # Errors
    ///
    /// [`ReproducirError::Timeout`] when the budget elapses. A predicate
    /// error aborts the wait immediately and propagates unchanged: the
    /// poller never retries through failures it does not understand.
    pub fn wait_until<T, F>(
        &self,
        target: &T,
        condition: &str,
        predicate: F,
    ) -> ReproducirResult<WaitOutcome>
    where
        T: Display + ?Sized,
        F: Fn(&T) -> ReproducirResult<bool>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let poll_interval = self.options.poll_interval();

        loop {
            if predicate(target)? {
                return Ok(WaitOutcome {
                    elapsed: start.elapsed(),
                    waited_for: condition.to_string(),
                });
            }
            if start.elapsed() >= timeout {
                break;
            }
            pause_for(poll_interval);
        }

        Err(ReproducirError::Timeout {
            condition: condition.to_string(),
            ms: self.options.timeout_ms,
            target: target.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    mod wait_options_tests {
        use super::*;

        #[test]
        fn defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn chained_builders() {
            let opts = WaitOptions::new().with_timeout(5000).with_poll_interval(10);
            assert_eq!(opts.timeout(), Duration::from_millis(5000));
            assert_eq!(opts.poll_interval(), Duration::from_millis(10));
        }

        #[test]
        fn timeout_from_fractional_seconds() {
            let opts = WaitOptions::new().with_timeout_secs(2.5);
            assert_eq!(opts.timeout_ms, 2500);
        }

        #[test]
        fn negative_seconds_clamp_to_zero() {
            let opts = WaitOptions::new().with_timeout_secs(-1.0);
            assert_eq!(opts.timeout_ms, 0);
        }
    }

    mod waiter_tests {
        use super::*;

        #[test]
        fn immediate_success() {
            let waiter = Waiter::with_options(WaitOptions::new().with_timeout(100));
            let outcome = waiter.wait_until("target", "truth", |_| Ok(true)).unwrap();
            assert_eq!(outcome.waited_for, "truth");
        }

        #[test]
        fn predicate_is_evaluated_at_least_once_with_zero_timeout() {
            let waiter = Waiter::with_options(WaitOptions::new().with_timeout(0));
            let outcome = waiter.wait_until("target", "truth", |_| Ok(true));
            assert!(outcome.is_ok());
        }

        #[test]
        fn timeout_error_carries_condition_and_target_dump() {
            let waiter =
                Waiter::with_options(WaitOptions::new().with_timeout(50).with_poll_interval(10));
            let err = waiter
                .wait_until("video src=blob:abc t=3.2/120", "playback done", |_| {
                    Ok(false)
                })
                .unwrap_err();
            match err {
                ReproducirError::Timeout {
                    condition,
                    ms,
                    target,
                } => {
                    assert_eq!(condition, "playback done");
                    assert_eq!(ms, 50);
                    assert!(target.contains("blob:abc"));
                }
                other => panic!("expected Timeout, got {other:?}"),
            }
        }

        #[test]
        fn predicate_error_aborts_without_retry() {
            let calls = Cell::new(0u32);
            let waiter =
                Waiter::with_options(WaitOptions::new().with_timeout(200).with_poll_interval(5));
            let err = waiter
                .wait_until("target", "never", |_| {
                    calls.set(calls.get() + 1);
                    Err(ReproducirError::Session {
                        message: "element vanished".to_string(),
                    })
                })
                .unwrap_err();
            assert_eq!(calls.get(), 1);
            assert!(matches!(err, ReproducirError::Session { .. }));
        }

        #[test]
        fn condition_becoming_true_is_observed() {
            let flag = Arc::new(AtomicBool::new(false));
            let flag_clone = Arc::clone(&flag);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                flag_clone.store(true, Ordering::SeqCst);
            });

            let waiter =
                Waiter::with_options(WaitOptions::new().with_timeout(500).with_poll_interval(5));
            let outcome = waiter.wait_until("target", "flag", |_| Ok(flag.load(Ordering::SeqCst)));
            assert!(outcome.is_ok());
        }
    }
}
