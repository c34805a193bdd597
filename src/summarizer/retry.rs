//! Retry schedules for summarizer calls

use crate::config::{BackoffConfig, SummarizerConfig};
use std::time::Duration;

/// Delay schedule applied after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failure
    Fixed(Duration),
    /// `initial * 2^attempt`, where `attempt` is the zero-based index of the failed attempt
    Exponential { initial: Duration },
}

impl From<BackoffConfig> for Backoff {
    fn from(config: BackoffConfig) -> Self {
        match config {
            BackoffConfig::Fixed { delay_ms } => Self::Fixed(Duration::from_millis(delay_ms)),
            BackoffConfig::Exponential { initial_ms } => Self::Exponential {
                initial: Duration::from_millis(initial_ms),
            },
        }
    }
}

/// Bounded retry policy: how many attempts, and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// The default config gives the per-page policy (3 attempts, 2 seconds
    /// apart); `max-attempts = 10` with exponential backoff from 1 second
    /// gives the extended one
    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: config.backoff.into(),
        }
    }

    /// Delay to wait after the zero-based `attempt` failed
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial } => {
                // Cap the shift; 2^16 seconds is already far beyond any sane wait
                initial.saturating_mul(1u32 << attempt.min(16))
            }
        }
    }

    /// True if another attempt is allowed after the zero-based `attempt` failed
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extended() -> RetryPolicy {
        RetryPolicy::from_config(&SummarizerConfig {
            max_attempts: 10,
            backoff: BackoffConfig::Exponential { initial_ms: 1000 },
            ..SummarizerConfig::default()
        })
    }

    #[test]
    fn test_default_config_is_page_policy() {
        let policy = RetryPolicy::from_config(&SummarizerConfig::default());
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_after(0), Duration::from_secs(2));
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
    }

    #[test]
    fn test_exponential_delays() {
        let policy = extended();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.delay_after(0), Duration::from_secs(1));
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(3), Duration::from_secs(8));
    }

    #[test]
    fn test_exponential_delay_does_not_overflow() {
        assert_eq!(extended().delay_after(40), Duration::from_secs(1 << 16));
    }

    #[test]
    fn test_has_next() {
        let policy = RetryPolicy::from_config(&SummarizerConfig::default());
        assert!(policy.has_next(0));
        assert!(policy.has_next(1));
        assert!(!policy.has_next(2));
    }

    #[test]
    fn test_from_config() {
        let config = SummarizerConfig {
            max_attempts: 5,
            backoff: BackoffConfig::Exponential { initial_ms: 250 },
            ..SummarizerConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
    }
}
