use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How often a failed request is retried.
///
/// Only transport failures, HTTP 429 and 5xx responses are retried. A
/// `Retry-After` hint from the server replaces the computed delay.
pub struct RetryPolicy {
    /// Total attempts including the first one; `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub interval: Duration,
    /// Double the delay after every retry.
    pub exponential_backoff: bool,
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            interval: Duration::ZERO,
            exponential_backoff: false,
        }
    }

    /// Three attempts, one second apart, doubling.
    pub const fn standard() -> Self {
        Self {
            max_attempts: 3,
            interval: Duration::from_secs(1),
            exponential_backoff: true,
        }
    }

    /// Delay before retrying after the failed `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(retry_after) = retry_after {
            return retry_after;
        }
        if !self.exponential_backoff {
            return self.interval;
        }
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.interval.saturating_mul(factor)
    }

    pub(crate) fn allows_another(&self, attempt: u32) -> bool {
        attempt < self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_attempt() {
        let policy = RetryPolicy::default();
        assert!(!policy.allows_another(1));

        let zero = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::none()
        };
        assert!(!zero.allows_another(1));
    }

    #[test]
    fn standard_backs_off_exponentially() {
        let policy = RetryPolicy::standard();
        assert!(policy.allows_another(1));
        assert!(policy.allows_another(2));
        assert!(!policy.allows_another(3));
        assert_eq!(policy.delay_for(1, None), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2, None), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3, None), Duration::from_secs(4));
    }

    #[test]
    fn linear_and_server_hint() {
        let policy = RetryPolicy {
            exponential_backoff: false,
            ..RetryPolicy::standard()
        };
        assert_eq!(policy.delay_for(3, None), Duration::from_secs(1));
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(9))),
            Duration::from_secs(9)
        );
    }
}
