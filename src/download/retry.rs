//! Retry budget and inter-attempt backoff for a single item.
//!
//! Every failed attempt is classified into a [`FailureType`]. All types are
//! retried until the per-item budget is spent; the type only changes how long
//! the fetcher waits before the next attempt and how loudly it is reported.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use snapgrab_core::download::{FailureType, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(8), 2.0);
//!
//! if let RetryDecision::Retry { delay, attempt } = policy.should_retry(FailureType::Transient, 1) {
//!     assert_eq!(attempt, 2);
//!     assert!(delay >= Duration::from_secs(1));
//! }
//! assert!(matches!(
//!     policy.should_retry(FailureType::RateLimited, 3),
//!     RetryDecision::DoNotRetry { .. }
//! ));
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use super::constants::DEFAULT_MAX_RETRIES;

/// First backoff step.
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Longest wait between two attempts; rate-limited retries wait this long.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Jitter never exceeds this, whatever the base delay.
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Timeout, transport error, non-200 status, or an invalid 200 body.
    Transient,

    /// 403 / 429 / origin error: the service is probably throttling us or the
    /// token went stale. Waits the full backoff cap before retrying.
    RateLimited,

    /// A failure nobody planned for. Still retried, but logged as an error so
    /// new failure classes get noticed.
    Unexpected,
}

/// What the fetcher should do after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// Pause before the next attempt.
        delay: Duration,
        /// Number of the next attempt; the first retry is attempt 2.
        attempt: u32,
    },

    /// Stop retrying this item.
    DoNotRetry {
        /// Human-readable reason.
        reason: String,
    },
}

/// Per-item retry budget with exponential backoff.
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt-1), max_delay) + jitter
/// ```
///
/// Rate-limited failures skip the ramp and wait `max_delay + jitter`. Jitter is
/// bounded by half the base delay (and by 500ms), so a zero base delay retries
/// immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per item, the first one included.
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_RETRIES)
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Default backoff with a different attempt budget.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self::new(
            max_attempts,
            DEFAULT_BASE_DELAY,
            DEFAULT_MAX_DELAY,
            DEFAULT_BACKOFF_MULTIPLIER,
        )
    }

    /// Creates a policy that retries without waiting.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO, 1.0)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed.
    #[instrument(level = "trace", skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, "attempt budget spent");
            return RetryDecision::DoNotRetry {
                reason: format!("all {} attempts exhausted", self.max_attempts),
            };
        }

        let wait = match failure_type {
            FailureType::RateLimited => self.max_delay,
            FailureType::Transient | FailureType::Unexpected => self.backoff_for(attempt),
        };
        let delay = wait + self.jitter();

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Capped exponential step for the attempt that just failed, without jitter.
    fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = f64::from(self.backoff_multiplier).powi(exponent);
        let step = self.base_delay.as_secs_f64() * factor;
        if !step.is_finite() || step >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(step)
        }
    }

    /// Uniform in `0..=min(base_delay / 2, MAX_JITTER)`.
    fn jitter(&self) -> Duration {
        let bound = (self.base_delay / 2).min(MAX_JITTER);
        if bound.is_zero() {
            return Duration::ZERO;
        }
        rand::thread_rng().gen_range(Duration::ZERO..=bound)
    }
}
