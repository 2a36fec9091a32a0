//! Retry utilities with exponential backoff.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles each attempt).
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            operation_name: "operation".to_string(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the given operation name.
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Execute an async operation, retrying errors that `is_retryable` accepts.
///
/// Non-retryable errors and the last error after `max_retries` are returned
/// as-is.
pub async fn retry_async<F, Fut, T, E, R>(
    config: &RetryConfig,
    is_retryable: R,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < config.max_retries && is_retryable(&e) => {
                let delay = config.delay_for_attempt(attempt);
                attempt += 1;
                debug!(
                    "{} attempt {} failed, retrying in {:?}: {}",
                    config.operation_name, attempt, delay, e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_retry_config_delay_calculation() {
        let config = RetryConfig::new("test").with_base_delay(Duration::from_millis(100));

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn test_retry_config_max_delay() {
        let config = RetryConfig::new("test").with_base_delay(Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(40), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_retry_async_eventual_success() {
        let config = RetryConfig::new("test").with_base_delay(Duration::from_millis(1));
        let call_count = AtomicU32::new(0);

        let result = retry_async(&config, |_: &&str| true, || {
            let count = call_count.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err("transient error")
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_async_gives_up_after_max_retries() {
        let config = RetryConfig::new("test")
            .with_base_delay(Duration::from_millis(1))
            .with_max_retries(2);
        let call_count = AtomicU32::new(0);

        let result: Result<(), &str> = retry_async(&config, |_: &&str| true, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Err("still down") }
        })
        .await;

        assert_eq!(result, Err("still down"));
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_async_skips_permanent_errors() {
        let config = RetryConfig::new("test").with_base_delay(Duration::from_millis(1));
        let call_count = AtomicU32::new(0);

        let result: Result<(), u16> = retry_async(&config, |code: &u16| *code >= 500, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Err(404) }
        })
        .await;

        assert_eq!(result, Err(404));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
