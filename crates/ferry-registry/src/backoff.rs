use std::time::Duration;

/// Retry behavior for network-bound registry operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first; 0 disables retries.
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Caps the exponential growth so late attempts stay bounded.
    pub max_delay: Duration,
    /// Per-attempt timeout. A timed-out attempt fails like any other error.
    pub op_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
            op_timeout: Duration::from_secs(600),
        }
    }
}

/// Delay before retry attempt `attempt` (0-based): doubles each time,
/// capped at `max_delay`.
pub fn backoff_delay(attempt: u32, initial_delay: Duration, max_delay: Duration) -> Duration {
    let multiplier = 2u32.saturating_pow(attempt);
    initial_delay.saturating_mul(multiplier).min(max_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_per_attempt() {
        let initial = Duration::from_millis(100);
        let max = Duration::from_secs(60);

        assert_eq!(backoff_delay(0, initial, max), Duration::from_millis(100));
        assert_eq!(backoff_delay(1, initial, max), Duration::from_millis(200));
        assert_eq!(backoff_delay(2, initial, max), Duration::from_millis(400));
        assert_eq!(backoff_delay(3, initial, max), Duration::from_millis(800));
    }

    #[test]
    fn delay_is_capped_at_max() {
        let initial = Duration::from_secs(1);
        let max = Duration::from_secs(5);

        assert_eq!(backoff_delay(10, initial, max), max);
        assert_eq!(backoff_delay(u32::MAX, initial, max), max);
    }
}
