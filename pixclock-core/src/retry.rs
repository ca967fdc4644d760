//! Bounded retry with a fixed backoff
//!
//! One policy type serves both callers: the display transport retries each
//! bus chunk inline with a blocking delay, while the sync session tracks
//! join failures across ticks with [`RetryTracker`].

use embedded_hal::delay::DelayNs;

/// Attempt count and wait between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Total attempts, including the first; 0 is treated as 1
    pub attempts: u8,
    /// Wait after a failed attempt
    pub backoff_ms: u32,
}

impl RetryPolicy {
    pub const fn new(attempts: u8, backoff_ms: u32) -> Self {
        Self {
            attempts,
            backoff_ms,
        }
    }

    fn max_attempts(&self) -> u8 {
        self.attempts.max(1)
    }

    /// Run `op` until it succeeds or the attempts are used up
    ///
    /// Returns the last error on exhaustion. No delay follows the final
    /// attempt.
    pub fn run<T, E, D: DelayNs>(
        &self,
        delay: &mut D,
        mut op: impl FnMut() -> Result<T, E>,
    ) -> Result<T, E> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts() => return Err(e),
                Err(_) => {
                    attempt += 1;
                    delay.delay_ms(self.backoff_ms);
                }
            }
        }
    }

    /// Start tracking attempts of an operation driven from a periodic loop
    pub fn tracker(&self) -> RetryTracker {
        RetryTracker {
            policy: *self,
            failures: 0,
        }
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetryStep {
    /// Try again once this timestamp (ms) is reached
    RetryAt(u64),
    /// No attempts left
    Exhausted,
}

/// Failure counter for a retried operation that spans many loop ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryTracker {
    policy: RetryPolicy,
    failures: u8,
}

impl RetryTracker {
    /// Record a failed attempt at `now_ms`
    pub fn record_failure(&mut self, now_ms: u64) -> RetryStep {
        self.failures = self.failures.saturating_add(1);
        if self.failures >= self.policy.max_attempts() {
            RetryStep::Exhausted
        } else {
            RetryStep::RetryAt(now_ms + self.policy.backoff_ms as u64)
        }
    }

    /// Number of the attempt in progress, starting at 1
    pub fn attempt(&self) -> u8 {
        self.failures.saturating_add(1)
    }

    pub fn failures(&self) -> u8 {
        self.failures
    }
}
