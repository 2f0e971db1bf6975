// src/steam/retry.rs
//! Retry policy for rate-limited calls.
//!
//! The policy owns the attempt budget, the delay schedule and the decision of
//! which errors are worth another attempt. Sleeping goes through a `Sleeper`,
//! so the schedule can be checked without waiting.

use std::time::Duration;

use tracing::warn;

use crate::config::consts::{DEFAULT_MAX_ATTEMPTS, RETRY_DELAY_MS};
use crate::core::net::Sleeper;
use crate::error::FetchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed,
    /// `delay * factor^(n-1)` before retry `n`.
    Exponential { factor: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included. Zero is treated as one.
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_millis(RETRY_DELAY_MS))
    }
}

/// How a retried operation ended.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Done { value: T, attempts: u32 },
    /// A non-retryable error; no further attempts were made.
    Aborted { error: FetchError, attempts: u32 },
    /// Every attempt hit a retryable error.
    Exhausted { last: FetchError, attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Done { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            RetryOutcome::Done { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay, backoff: Backoff::Fixed }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Only rate limiting is retried; every other failure is final.
    pub fn is_retryable(&self, err: &FetchError) -> bool {
        err.is_rate_limited()
    }

    /// Pause before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { factor } => {
                let exp = retry.saturating_sub(1);
                let mult = factor.max(1).saturating_pow(exp);
                self.delay.saturating_mul(mult)
            }
        }
    }

    /// Run `op` until it succeeds, fails for good, or the budget runs out.
    /// `op` receives the 1-based attempt number. No pause follows the last attempt.
    pub fn run<T, S, F>(&self, sleeper: &S, mut op: F) -> RetryOutcome<T>
    where
        S: Sleeper + ?Sized,
        F: FnMut(u32) -> Result<T, FetchError>,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return RetryOutcome::Done { value, attempts: attempt },
                Err(error) if !self.is_retryable(&error) => {
                    return RetryOutcome::Aborted { error, attempts: attempt };
                }
                Err(last) if attempt >= max => {
                    return RetryOutcome::Exhausted { last, attempts: attempt };
                }
                Err(e) => {
                    let pause = self.delay_for(attempt);
                    warn!("{e}; retrying in {pause:?} ({attempt}/{max})");
                    sleeper.sleep(pause);
                    attempt += 1;
                }
            }
        }
    }
}
