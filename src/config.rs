//! Configuration types for yt-seo-etl
//!
//! Every sub-config has serde defaults so a partial JSON document (or
//! `Config::default()`) is usable. Credentials come from the environment via
//! [`Config::from_env`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Environment variable holding the YouTube Data API key
pub const ENV_YOUTUBE_KEY: &str = "DEVELOPER_KEY";
/// Environment variable holding the object store access key
pub const ENV_AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
/// Environment variable holding the object store secret key
pub const ENV_AWS_SECRET_KEY: &str = "AWS_SECRET_KEY";
/// Environment variable holding the destination bucket
pub const ENV_S3_BUCKET: &str = "S3_BUCKET";
/// Environment variable holding the LLM API key
pub const ENV_OPENAI_KEY: &str = "OPENAI_API_KEY";

const MIB: u64 = 1024 * 1024;

/// YouTube Data API settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// API key sent as the `key` query parameter
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the Data API (default: "https://www.googleapis.com/youtube/v3")
    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_youtube_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_youtube_base_url(),
            timeout: default_youtube_timeout(),
        }
    }
}

/// Object store settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Destination bucket
    #[serde(default)]
    pub bucket: String,

    /// Region (default: "us-east-1")
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores (MinIO, R2)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Access key ID
    #[serde(default)]
    pub access_key_id: String,

    /// Secret access key
    #[serde(default)]
    pub secret_access_key: String,

    /// Files strictly larger than this use multipart upload (default: 100 MiB)
    #[serde(default = "default_multipart_threshold")]
    pub multipart_threshold: u64,

    /// Size of each multipart chunk (default: 100 MiB)
    #[serde(default = "default_part_size")]
    pub part_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
            multipart_threshold: default_multipart_threshold(),
            part_size: default_part_size(),
        }
    }
}

/// LLM completion settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (None disables LLM-backed analysis)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API (default: "https://api.openai.com/v1")
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model name (default: "gpt-3.5-turbo")
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature (default: 0.5)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Input longer than this many characters is truncated (default: 14000)
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Per-request timeout (default: 60 seconds)
    #[serde(default = "default_llm_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_input_chars: default_max_input_chars(),
            timeout: default_llm_timeout(),
        }
    }
}

/// Retry configuration for transient failures
///
/// The wait before retry `n` (1-based) is
/// `initial_delay * backoff_multiplier^(n-1)` clamped to `[min_delay, max_delay]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay the exponential grows from (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Lower bound on any single wait (default: 4 seconds)
    #[serde(default = "default_min_delay", with = "duration_serde")]
    pub min_delay: Duration,

    /// Upper bound on any single wait (default: 10 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            min_delay: default_min_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Comment analytics settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of keywords listed in reports (default: 10)
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,

    /// Number of topics extracted (default: 5)
    #[serde(default = "default_num_topics")]
    pub num_topics: usize,

    /// Maximum number of cached LLM summaries (default: 100)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_keywords: default_top_keywords(),
            num_topics: default_num_topics(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Main configuration for the pipeline
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// YouTube Data API access
    #[serde(default)]
    pub youtube: YouTubeConfig,

    /// Object store destination
    #[serde(default)]
    pub storage: StorageConfig,

    /// LLM completions
    #[serde(default)]
    pub llm: LlmConfig,

    /// Retry policy for remote calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Comment analytics
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Directory local artifacts are written to (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Config {
    /// Build a configuration from environment variables
    ///
    /// Loads `.env` from the working directory first if one exists. Requires
    /// `AWS_ACCESS_KEY`, `AWS_SECRET_KEY` and `S3_BUCKET`. `DEVELOPER_KEY` and
    /// `OPENAI_API_KEY` are optional here and checked by the commands that use them.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "could not load .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                Error::config(key, format!("required environment variable {key} is not set"))
            })
        };

        let mut config = Config::default();

        config.youtube.api_key = get(ENV_YOUTUBE_KEY).unwrap_or_default();
        if let Some(base) = get("YOUTUBE_API_BASE") {
            config.youtube.base_url = base;
        }

        config.storage.access_key_id = require(ENV_AWS_ACCESS_KEY)?;
        config.storage.secret_access_key = require(ENV_AWS_SECRET_KEY)?;
        config.storage.bucket = require(ENV_S3_BUCKET)?;
        if let Some(region) = get("AWS_REGION") {
            config.storage.region = region;
        }
        config.storage.endpoint = get("S3_ENDPOINT");

        config.llm.api_key = get(ENV_OPENAI_KEY);
        if let Some(base) = get("OPENAI_API_BASE") {
            config.llm.base_url = base;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            config.llm.model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.youtube.base_url).map_err(|e| {
            Error::config("youtube.base_url", format!("invalid URL {}: {e}", self.youtube.base_url))
        })?;
        url::Url::parse(&self.llm.base_url).map_err(|e| {
            Error::config("llm.base_url", format!("invalid URL {}: {e}", self.llm.base_url))
        })?;
        if self.retry.max_attempts == 0 {
            return Err(Error::config("retry.max_attempts", "must be at least 1"));
        }
        if self.retry.min_delay > self.retry.max_delay {
            return Err(Error::config(
                "retry.min_delay",
                "must not be greater than retry.max_delay",
            ));
        }
        // S3 rejects parts under 5 MiB except the last one
        if self.storage.part_size < 5 * MIB {
            return Err(Error::config("storage.part_size", "must be at least 5 MiB"));
        }
        Ok(())
    }

    /// Returns the YouTube key or a configuration error naming the variable
    pub fn require_youtube_key(&self) -> Result<&str> {
        if self.youtube.api_key.trim().is_empty() {
            return Err(Error::config(
                ENV_YOUTUBE_KEY,
                format!("required environment variable {ENV_YOUTUBE_KEY} is not set"),
            ));
        }
        Ok(&self.youtube.api_key)
    }

    /// Returns the LLM key or a configuration error naming the variable
    pub fn require_llm_key(&self) -> Result<&str> {
        self.llm.api_key.as_deref().ok_or_else(|| {
            Error::config(
                ENV_OPENAI_KEY,
                format!("required environment variable {ENV_OPENAI_KEY} is not set"),
            )
        })
    }
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_youtube_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_multipart_threshold() -> u64 {
    100 * MIB
}

fn default_part_size() -> u64 {
    100 * MIB
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_input_chars() -> usize {
    14_000
}

fn default_llm_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_min_delay() -> Duration {
    Duration::from_secs(4)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_top_keywords() -> usize {
    10
}

fn default_num_topics() -> usize {
    5
}

fn default_cache_capacity() -> usize {
    100
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

// Duration serialization helper (whole milliseconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
