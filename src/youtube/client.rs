//! HTTP client for the YouTube Data API with retrying request execution.

use crate::config::{RetryConfig, YouTubeConfig};
use crate::error::{Error, Result};
use crate::retry::{is_retryable_status, with_retry};
use serde::de::DeserializeOwned;

/// Maximum number of response-body bytes kept in error messages
const MAX_ERROR_BODY: usize = 512;

/// Client for the YouTube Data API v3
///
/// Each request goes through [`YouTubeClient::execute`], which retries
/// 429/500/503 responses and network timeouts according to the configured
/// [`RetryConfig`].
#[derive(Clone, Debug)]
pub struct YouTubeClient {
    http: reqwest::Client,
    config: YouTubeConfig,
    retry: RetryConfig,
}

impl YouTubeClient {
    /// Create a client
    ///
    /// Fails with [`Error::Config`] when the API key is empty.
    pub fn new(config: YouTubeConfig, retry: RetryConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::config(
                crate::config::ENV_YOUTUBE_KEY,
                "YouTube API key is required",
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            retry,
        })
    }

    /// Send a GET request to `endpoint` and decode the JSON body
    ///
    /// The API key is appended to `query`. Retryable failures are retried;
    /// once attempts run out the last [`Error::TransientService`] is returned.
    pub async fn execute<T>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let url = url.as_str();
        let mut attempt: u32 = 0;

        with_retry(&self.retry, endpoint, || {
            attempt += 1;
            self.send_once(url, query, attempt)
        })
        .await
    }

    async fn send_once<T>(&self, url: &str, query: &[(&str, String)], attempt: u32) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| classify_transport_error(e, attempt))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| classify_transport_error(e, attempt))?;
            return serde_json::from_slice(&body).map_err(|e| {
                Error::MalformedResponse(format!("unexpected response from {url}: {e}"))
            });
        }

        let code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = truncate_body(&body);

        if is_retryable_status(code) {
            Err(Error::TransientService {
                status: Some(code),
                message,
                attempts: attempt,
            })
        } else {
            Err(Error::PermanentService {
                status: code,
                message,
            })
        }
    }
}

/// Timeouts and connection failures are transient; anything else is a plain network error
fn classify_transport_error(e: reqwest::Error, attempt: u32) -> Error {
    if e.is_timeout() || e.is_connect() {
        Error::TransientService {
            status: None,
            message: e.to_string(),
            attempts: attempt,
        }
    } else {
        Error::Network(e)
    }
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
