//! Retry delays for the dataset refresh loop.
//!
//! After a failed fetch the loop retries sooner than its regular refresh
//! interval, doubling the wait on each consecutive failure up to a ceiling.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const JITTER_RATIO: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct RetryBackoff {
    base: Duration,
    max: Duration,
    failures: u32,
}

impl RetryBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        Self {
            base,
            max: max.max(base),
            failures: 0,
        }
    }

    /// Consecutive failures since the last success.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Record a failure and return how long to wait before the next attempt.
    pub fn fail(&mut self) -> Duration {
        let exponent = self.failures.min(16);
        self.failures = self.failures.saturating_add(1);
        let delay = self.base.saturating_mul(1 << exponent).min(self.max);
        with_jitter(delay)
    }
}

fn with_jitter(delay: Duration) -> Duration {
    let spread_ms = (delay.as_millis() as f64 * JITTER_RATIO) as u64;
    if spread_ms == 0 {
        return delay;
    }
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);
    delay + Duration::from_millis(seed % (spread_ms + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_until_capped() {
        let mut backoff = RetryBackoff::new(Duration::from_millis(100), Duration::from_millis(350));

        let first = backoff.fail();
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(120));
        let second = backoff.fail();
        assert!(second >= Duration::from_millis(200) && second <= Duration::from_millis(240));
        let third = backoff.fail();
        assert!(third >= Duration::from_millis(350) && third <= Duration::from_millis(420));
        assert_eq!(backoff.failures(), 3);
    }

    #[test]
    fn reset_starts_over() {
        let mut backoff = RetryBackoff::new(Duration::from_millis(50), Duration::from_secs(5));
        backoff.fail();
        backoff.fail();
        backoff.reset();
        assert_eq!(backoff.failures(), 0);
        assert!(backoff.fail() <= Duration::from_millis(60));
    }
}
