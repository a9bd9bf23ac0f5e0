//! Retry policy for transient ledger failures

use guestbook_core::{BackoffStrategy, RetryConfig};
use rand::Rng;
use std::time::Duration;

/// How many times to try and how long to wait between tries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Base delay
    pub initial_delay: Duration,
    /// Cap on any single delay
    pub max_delay: Duration,
    /// Growth of the delay
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff: BackoffStrategy::Fixed,
        }
    }

    /// Delay before retry number `attempt` (zero-based: 0 = first retry)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffStrategy::Fixed => self.initial_delay,
            BackoffStrategy::Linear => self.initial_delay.saturating_mul(attempt + 1),
            BackoffStrategy::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
            BackoffStrategy::ExponentialWithJitter => {
                let base = self
                    .initial_delay
                    .saturating_mul(2u32.saturating_pow(attempt));
                let jitter =
                    (base.as_millis() as f64 * 0.1 * rand::thread_rng().gen::<f64>()) as u64;
                base.saturating_add(Duration::from_millis(jitter))
            }
        };

        delay.min(self.max_delay)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff: config.backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy(backoff: BackoffStrategy) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1_000),
            backoff,
        }
    }

    #[test]
    fn fixed_linear_exponential() {
        let fixed = policy(BackoffStrategy::Fixed);
        assert_eq!(fixed.delay_for(3), Duration::from_millis(100));

        let linear = policy(BackoffStrategy::Linear);
        assert_eq!(linear.delay_for(0), Duration::from_millis(100));
        assert_eq!(linear.delay_for(2), Duration::from_millis(300));

        let exponential = policy(BackoffStrategy::Exponential);
        assert_eq!(exponential.delay_for(0), Duration::from_millis(100));
        assert_eq!(exponential.delay_for(2), Duration::from_millis(400));
        assert_eq!(exponential.delay_for(10), Duration::from_millis(1_000));
    }

    #[test]
    fn from_config_never_zero_attempts() {
        let config = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        assert_eq!(RetryPolicy::from(&config).max_attempts, 1);
    }

    proptest! {
        #[test]
        fn jitter_stays_within_bounds(attempt in 0u32..8) {
            let jittered = policy(BackoffStrategy::ExponentialWithJitter);
            let plain = policy(BackoffStrategy::Exponential);
            let delay = jittered.delay_for(attempt);

            prop_assert!(delay <= jittered.max_delay);
            prop_assert!(delay >= plain.delay_for(attempt).min(jittered.max_delay));
        }
    }
}
