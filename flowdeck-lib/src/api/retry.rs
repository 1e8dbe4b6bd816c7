//! Backoff policy for transient request failures.

use std::time::Duration;

use crate::error::ApiError;

/// How the client retries requests that failed transiently.
///
/// Server errors (500, 502, 503, 504), network errors and timeouts are always
/// candidates for a retry; rate limiting (429) can be switched off for callers
/// that prefer to surface it. Delays double from `initial_delay` and never
/// exceed `max_delay`.
///
/// ```
/// use std::time::Duration;
/// use flowdeck_lib::api::RetryConfig;
///
/// let patient = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(250));
/// assert_eq!(patient.delay_for(2), Duration::from_secs(1));
///
/// let once = RetryConfig::no_retry();
/// assert_eq!(once.max_retries, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Retry HTTP 429 responses.
    pub retry_rate_limited: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            retry_rate_limited: true,
        }
    }
}

impl RetryConfig {
    /// Every request is sent exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn retry_rate_limited(mut self, enabled: bool) -> Self {
        self.retry_rate_limited = enabled;
        self
    }

    /// Whether a request that failed with `err` may be sent again.
    pub fn should_retry(&self, err: &ApiError) -> bool {
        if self.max_retries == 0 || !err.is_retryable() {
            return false;
        }
        match err.status_code() {
            Some(429) => self.retry_rate_limited,
            _ => true,
        }
    }

    /// Delay before retry number `attempt`, counting from zero.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }
}
