//! Bounded retry with fixed or exponential backoff.
//!
//! Every retry loop in the pipeline goes through [`RetryPolicy`], which
//! always terminates and reports how it ended via [`RetryOutcome`].

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// Delay schedule between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failed attempt.
    Fixed(Duration),
    /// `base * factor^(n-1)` after the n-th failed attempt, capped at `max`.
    Exponential {
        base: Duration,
        factor: u32,
        max: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

/// How a retried operation ended.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Success { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: E },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Exhausted { last_error, .. } => Err(last_error),
        }
    }
}

impl RetryPolicy {
    pub fn fixed(delay: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Doubling backoff from `base`, capped at `max`.
    pub fn exponential(base: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential {
                base,
                factor: 2,
                max,
            },
        }
    }

    /// A single attempt, no retries.
    pub fn once() -> Self {
        Self::fixed(Duration::ZERO, 1)
    }

    fn attempt_limit(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match &self.backoff {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { base, factor, max } => {
                let exponent = attempt.saturating_sub(1);
                let multiplier = factor.checked_pow(exponent).unwrap_or(u32::MAX);
                base.saturating_mul(multiplier).min(*max)
            }
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, op: F) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_while(operation, |_| true, op).await
    }

    /// Like [`run`](Self::run) but stops early on errors `is_retryable`
    /// rejects.
    pub async fn run_while<T, E, F, Fut, P>(
        &self,
        operation: &str,
        is_retryable: P,
        mut op: F,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let limit = self.attempt_limit();
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Succeeded after retry");
                    }
                    return RetryOutcome::Success {
                        value,
                        attempts: attempt,
                    };
                }
                Err(e) if attempt < limit && is_retryable(&e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts = limit,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(operation, attempts = attempt, error = %e, "Giving up");
                    return RetryOutcome::Exhausted {
                        attempts: attempt,
                        last_error: e,
                    };
                }
            }
        }
    }
}
