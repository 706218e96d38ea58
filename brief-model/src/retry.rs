use brief_core::{BriefError, Result};
use std::{future::Future, time::Duration};

/// Exponential backoff policy for hosted model calls.
///
/// Only request setup is retried. Once a reply has started streaming, a
/// failure is returned to the caller as is.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    #[must_use]
    pub fn with_backoff_multiplier(mut self, backoff_multiplier: f32) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    /// Wait before retry number `retry` (0-based): `initial * multiplier^retry`,
    /// capped at `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = f64::from(self.backoff_multiplier.max(1.0)).powi(retry.min(64) as i32);
        let secs = self.initial_delay.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

/// Request timeout, rate limiting and the 5xx gateway family.
#[must_use]
pub fn is_retryable_status_code(status_code: u16) -> bool {
    matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Phrases of transport failures and provider throttling.
const TRANSIENT_MARKERS: &[&str] = &[
    "RATE LIMIT",
    "TOO MANY REQUESTS",
    "RESOURCE_EXHAUSTED",
    "UNAVAILABLE",
    "DEADLINE_EXCEEDED",
    "TIMED OUT",
    "TIMEOUT",
    "CONNECTION RESET",
    "CONNECTION REFUSED",
];

/// Classifies an error message.
///
/// Messages built from an HTTP status carry an explicit `retryable` or
/// `non-retryable` tag, which wins over any phrase in the response body.
#[must_use]
pub fn is_retryable_error_message(message: &str) -> bool {
    if message.contains(", non-retryable)") {
        return false;
    }
    if message.contains(", retryable)") {
        return true;
    }
    let upper = message.to_ascii_uppercase();
    TRANSIENT_MARKERS.iter().any(|marker| upper.contains(marker))
}

#[must_use]
pub fn is_retryable_model_error(error: &BriefError) -> bool {
    matches!(error, BriefError::Model(message) if is_retryable_error_message(message))
}

/// Runs `operation` until it succeeds, fails with an error `is_retryable`
/// rejects, or `max_retries` retries have been spent.
pub async fn execute_with_retry<T, Op, Fut, Classify>(
    retry_config: &RetryConfig,
    is_retryable: Classify,
    mut operation: Op,
) -> Result<T>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    Classify: Fn(&BriefError) -> bool,
{
    let budget = if retry_config.enabled { retry_config.max_retries } else { 0 };
    let mut retry = 0;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        if retry >= budget || !is_retryable(&error) {
            return Err(error);
        }

        let delay = retry_config.delay_for(retry);
        retry += 1;
        brief_telemetry::warn!(
            retry,
            max_retries = budget,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "transient model error, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
