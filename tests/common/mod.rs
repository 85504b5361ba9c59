//! Common test utilities for yt-seo-etl integration tests

#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;

use std::time::Duration;
use yt_seo_etl::YouTubeClient;
use yt_seo_etl::config::{RetryConfig, YouTubeConfig};

/// Retry policy with millisecond waits so retry paths stay fast
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 5,
        initial_delay: Duration::from_millis(1),
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

/// YouTube client pointed at a mock server
#[allow(clippy::unwrap_used)]
pub fn youtube_client(base_url: &str) -> YouTubeClient {
    YouTubeClient::new(
        YouTubeConfig {
            api_key: "test-key".to_string(),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
        },
        fast_retry(),
    )
    .unwrap()
}
