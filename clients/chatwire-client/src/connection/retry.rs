//! Reconnect policy
//!
//! Exponential backoff between consecutive failed connection attempts with an
//! optional cap on how many failures are tolerated before giving up. The
//! delay schedule itself comes from [`exponential_backoff::Backoff`]; this
//! type adds the give-up accounting on top.

use exponential_backoff::Backoff;
use std::time::Duration;

/// Spread applied to every delay so that many clients do not reconnect in
/// lockstep
pub const DEFAULT_JITTER: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay after the first failure
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor applied per consecutive failure
    pub multiplier: u32,
    /// Random spread as a fraction of the delay, in `0.01..=1.0`
    pub jitter: f32,
    /// Consecutive failures tolerated (None = retry forever)
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Reconnect at once, forever
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1,
            jitter: DEFAULT_JITTER,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    fn backoff(&self) -> Backoff {
        // Exhaustion is tracked here, so the schedule itself never runs out.
        let mut backoff = Backoff::new(u32::MAX - 1, self.initial_delay, self.max_delay);
        backoff.set_factor(self.multiplier.max(1));
        backoff.set_jitter(self.jitter.clamp(0.01, 1.0));
        backoff
    }

    /// Delay to wait after the `failures`-th consecutive failure (1-based)
    pub fn delay_for(&self, failures: u32) -> Duration {
        if failures == 0 || self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        self.backoff()
            .next(failures - 1)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether `failures` consecutive failures exhaust the policy
    pub fn is_exhausted(&self, failures: u32) -> bool {
        matches!(self.max_attempts, Some(max) if failures >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2,
            jitter: DEFAULT_JITTER,
            max_attempts: Some(30),
        }
    }
}
