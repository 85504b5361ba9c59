//! # yt-seo-etl
//!
//! Sequential ETL for YouTube comments: fetch video statistics and every
//! top-level comment, write them to a local CSV or JSON artifact, upload the
//! artifact to an S3-compatible bucket without overwriting existing objects,
//! and optionally produce a Markdown SEO report from the comment text.
//!
//! ## Design
//!
//! - **Retry at the edges** - every remote call goes through [`retry::with_retry`]
//! - **Idempotent uploads** - an existing object key is never written again
//! - **No partial multipart sessions** - a failed multipart upload is aborted
//! - **Fail fast** - the first unrecovered error stops a batch and names the video
//!
//! ## Quick Start
//!
//! ```no_run
//! use yt_seo_etl::{Config, Pipeline, RunOptions, S3ObjectStore, ObjectStoreWriter, YouTubeClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!
//!     let youtube = YouTubeClient::new(config.youtube.clone(), config.retry.clone())?;
//!     let store = S3ObjectStore::new(&config.storage)?;
//!     let writer = ObjectStoreWriter::new(store, &config.storage);
//!
//!     let mut pipeline = Pipeline::new(youtube, writer, RunOptions::default());
//!     let runs = pipeline.run(["dQw4w9WgXcQ"]).await?;
//!     println!("uploaded {}", runs[0].upload.key());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Comment analytics and SEO reports
pub mod analysis;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Local comment artifacts
pub mod export;
/// Per-video orchestration
pub mod pipeline;
/// Retry logic with exponential backoff
pub mod retry;
/// Object storage backends and the idempotent writer
pub mod storage;
/// Video identifier helpers
pub mod utils;
/// YouTube Data API client
pub mod youtube;

pub use analysis::{OpenAiClient, SeoAnalyzer, SeoReport, TextCompletion};
pub use config::Config;
pub use error::{Error, ObjectStoreError, Result};
pub use export::OutputFormat;
pub use pipeline::{Pipeline, RunOptions, VideoRun};
pub use storage::{MemoryObjectStore, ObjectStore, ObjectStoreWriter, S3ObjectStore, UploadOutcome};
pub use youtube::{CommentRecord, VideoDetails, YouTubeClient};
