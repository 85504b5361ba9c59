//! Retry logic with exponential backoff
//!
//! Wraps a single remote call with bounded retry. Errors classify themselves
//! through [`IsRetryable`]; only retryable errors are tried again, everything
//! else is returned after the first attempt.
//!
//! # Example
//!
//! ```no_run
//! use yt_seo_etl::retry::{IsRetryable, with_retry};
//! use yt_seo_etl::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Busy,
//!     Denied,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Busy)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! with_retry(&config, "example", || async { Ok::<_, MyError>(()) }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// HTTP statuses treated as transient: rate limiting and server-side failures
pub const RETRYABLE_STATUSES: [u16; 3] = [429, 500, 503];

/// Trait for errors that can be classified as retryable or not
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::TransientService { .. } => true,
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::Interrupted
            ),
            Error::Config { .. }
            | Error::PermanentService { .. }
            | Error::MalformedResponse(_)
            | Error::ObjectStore(_)
            | Error::UploadSession { .. }
            | Error::Llm(_)
            | Error::Video { .. }
            | Error::Serialization(_)
            | Error::Csv(_) => false,
        }
    }
}

/// Returns true if an HTTP status should be retried
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Execute an async operation with bounded exponential backoff
///
/// `operation` is invoked at most `config.max_attempts` times. A
/// non-retryable error is returned immediately; the last retryable error is
/// returned once attempts run out.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(
                        operation = operation_name,
                        attempts = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = backoff_delay(config, attempt);
                let delay = if config.jitter { add_jitter(delay) } else { delay };

                tracing::warn!(
                    operation = operation_name,
                    error = %e,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Request failed with transient error, retrying"
                );

                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        operation = operation_name,
                        error = %e,
                        attempts = attempt,
                        "Request failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(
                        operation = operation_name,
                        error = %e,
                        "Request failed with non-retryable error"
                    );
                }
                return Err(e);
            }
        }
    }
}

/// Wait before retry number `retry` (1-based)
///
/// `initial_delay * backoff_multiplier^(retry-1)`, clamped to
/// `[min_delay, max_delay]`.
pub fn backoff_delay(config: &RetryConfig, retry: u32) -> Duration {
    let exponent = retry.saturating_sub(1).min(63) as i32;
    let secs = config.initial_delay.as_secs_f64() * config.backoff_multiplier.powi(exponent);
    let raw = if secs.is_finite() {
        Duration::from_secs_f64(secs.min(config.max_delay.as_secs_f64()))
    } else {
        config.max_delay
    };
    raw.clamp(config.min_delay, config.max_delay.max(config.min_delay))
}

/// Add random jitter of 0–100% to a delay
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient error"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            min_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn test_success_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), "test", || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn test_four_transient_failures_then_success() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), "test", || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 4 {
                    Err(TestError::Transient)
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 5, "fifth attempt succeeds");
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), "test", || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Transient)));
        assert_eq!(counter.load(Ordering::SeqCst), 5, "five attempts total");
    }

    #[tokio::test]
    async fn test_permanent_error_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), "test", || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Permanent)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Permanent)));
        assert_eq!(
            counter.load(Ordering::SeqCst),
            1,
            "should not retry permanent error"
        );
    }

    #[tokio::test]
    async fn test_waits_between_attempts() {
        let start = std::time::Instant::now();

        let _ = with_retry(&fast_config(3), "test", || async {
            Err::<i32, _>(TestError::Transient)
        })
        .await;

        // two waits, each at least min_delay
        assert!(
            start.elapsed() >= Duration::from_millis(10),
            "waited {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn test_default_delays_stay_in_bounds() {
        let config = RetryConfig::default();
        let delays: Vec<u64> = (1..=4)
            .map(|n| backoff_delay(&config, n).as_secs())
            .collect();

        assert_eq!(delays, vec![4, 4, 4, 8]);
        assert_eq!(backoff_delay(&config, 5), Duration::from_secs(10));
        assert_eq!(backoff_delay(&config, 40), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_within_bounds() {
        let delay = Duration::from_millis(100);
        let jittered = add_jitter(delay);
        assert!(jittered >= delay);
        assert!(jittered <= delay * 2);
    }

    #[test]
    fn test_status_classification() {
        for status in [429, 500, 503] {
            assert!(is_retryable_status(status), "{status} should retry");
        }
        for status in [400, 401, 403, 404, 502] {
            assert!(!is_retryable_status(status), "{status} should not retry");
        }
    }

    #[test]
    fn test_error_is_retryable() {
        let transient = Error::TransientService {
            status: Some(429),
            message: "quota".to_string(),
            attempts: 1,
        };
        assert!(transient.is_retryable());

        let permanent = Error::PermanentService {
            status: 404,
            message: "missing".to_string(),
        };
        assert!(!permanent.is_retryable());

        let timeout = Error::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "t"));
        assert!(timeout.is_retryable());

        assert!(!Error::MalformedResponse("bad".to_string()).is_retryable());
        assert!(!Error::config("DEVELOPER_KEY", "missing").is_retryable());
    }
}
