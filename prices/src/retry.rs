//! Retry policy shared by all outbound price lookups.
//!
//! Attempts are numbered from 1. After failed attempt `n` the policy waits
//! `initial_backoff * multiplier^(n-1)`, capped at `max_backoff`, and tries
//! again until `max_attempts` is reached. Only errors that
//! [`PriceError::is_retryable`] classifies as transient are retried.

use std::time::Duration;

use log::debug;

use crate::error::PriceError;

/// Default number of attempts (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay after the first failure.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(200);

/// Default growth factor between delays.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Default upper bound for a single delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Waits between attempts. Injected so tests never block.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Exponential backoff retry policy.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            multiplier: DEFAULT_MULTIPLIER,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .map(|d| d.min(self.max_backoff))
            .unwrap_or(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `op` receives the attempt number.
    pub fn run<T, F>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, PriceError>
    where
        F: FnMut(u32) -> Result<T, PriceError>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() || attempt >= max_attempts => return Err(e),
                Err(e) => {
                    let delay = self.backoff(attempt);
                    debug!("Attempt {attempt}/{max_attempts} failed: {e}; retrying in {delay:?}");
                    sleeper.sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}
