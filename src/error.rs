//! Error types for yt-seo-etl
//!
//! One [`Error`] enum covers the whole pipeline. Variants follow the failure
//! classes the pipeline distinguishes:
//! - configuration problems found at construction time
//! - transient remote failures (retried, then surfaced)
//! - permanent remote failures and malformed responses
//! - object-store and multipart-session failures
//! - per-video context added by the orchestrator

use thiserror::Error;

/// Result type alias for yt-seo-etl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for yt-seo-etl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is missing or invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "DEVELOPER_KEY")
        key: Option<String>,
    },

    /// Remote call failed with a retryable condition (429/500/503, timeout, connect)
    #[error("transient service error{}: {message} (after {attempts} attempt(s))", fmt_status(.status))]
    TransientService {
        /// HTTP status of the last failure, if the failure had one
        status: Option<u16>,
        /// Last observed error message
        message: String,
        /// Number of attempts made so far
        attempts: u32,
    },

    /// Remote call failed with a non-retryable status
    #[error("permanent service error (status {status}): {message}")]
    PermanentService {
        /// HTTP status returned by the service
        status: u16,
        /// Response body or error description
        message: String,
    },

    /// Response could not be decoded into the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Object store operation failed
    #[error("object store error: {0}")]
    ObjectStore(#[from] ObjectStoreError),

    /// A multipart upload failed part-way and was aborted
    ///
    /// `source` is the failure that interrupted the upload. If the abort call
    /// failed as well its error is kept in `abort_error`.
    #[error(
        "multipart upload {upload_id} for {key} failed: {source}{}",
        fmt_abort(.abort_error)
    )]
    UploadSession {
        /// Object key being uploaded
        key: String,
        /// Upload ID returned when the session was created
        upload_id: String,
        /// The original failure
        #[source]
        source: Box<Error>,
        /// Failure of the abort call, if it failed too
        abort_error: Option<Box<Error>>,
    },

    /// LLM completion failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Processing of one video failed; carries the video being processed
    #[error("video {video_id}: {source}")]
    Video {
        /// The video identifier being processed when the failure happened
        video_id: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Object store errors
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// Object does not exist
    #[error("object {key} not found in bucket {bucket}")]
    NotFound {
        /// Bucket that was queried
        bucket: String,
        /// Missing object key
        key: String,
    },

    /// A store request failed
    #[error("{operation} failed for {bucket}/{key}: {reason}")]
    RequestFailed {
        /// The store operation (e.g., "head_object", "upload_part")
        operation: &'static str,
        /// Target bucket
        bucket: String,
        /// Target key
        key: String,
        /// Error reported by the store
        reason: String,
    },

    /// The store answered without a field the protocol requires
    #[error("{operation} for {key} returned no {field}")]
    MissingField {
        /// The store operation
        operation: &'static str,
        /// Target key
        key: String,
        /// Missing response field
        field: &'static str,
    },
}

impl Error {
    /// Build a configuration error for a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Attach the video being processed to an error
    pub fn for_video(self, video_id: impl Into<String>) -> Self {
        Error::Video {
            video_id: video_id.into(),
            source: Box::new(self),
        }
    }

    /// Returns the HTTP status carried by service errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::TransientService { status, .. } => *status,
            Error::PermanentService { status, .. } => Some(*status),
            Error::Video { source, .. } => source.status(),
            _ => None,
        }
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

fn fmt_abort(abort_error: &Option<Box<Error>>) -> String {
    abort_error
        .as_ref()
        .map(|e| format!("; abort also failed: {e}"))
        .unwrap_or_default()
}
