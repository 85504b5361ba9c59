//! Object storage: backend trait, S3 and in-memory backends, idempotent writer.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod memory;
mod s3;
mod writer;

pub use memory::{MemoryObjectStore, StoreCall, StoreOperation};
pub use s3::S3ObjectStore;
pub use writer::{ObjectStoreWriter, UploadOutcome, UploadSession};

/// Tag identifying one uploaded part of a multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPartTag {
    /// Part number, starting at 1
    pub part_number: i32,
    /// ETag returned by the store for this part
    pub etag: String,
}

/// Operations the pipeline needs from a remote object store
///
/// Implementations map store-specific failures onto [`crate::Error`]. Only
/// [`ObjectStore::exists`] turns "not found" into a regular value.
///
/// # Examples
///
/// ```no_run
/// use yt_seo_etl::storage::{MemoryObjectStore, ObjectStore};
///
/// # async fn example() -> yt_seo_etl::Result<()> {
/// let store = MemoryObjectStore::new("bucket");
/// assert!(!store.exists("report.csv").await?);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket objects are written to
    fn bucket(&self) -> &str;

    /// Check whether `key` exists; not-found is `Ok(false)`
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Upload a whole file in one request
    async fn put_file(&self, key: &str, path: &Path) -> Result<()>;

    /// Start a multipart upload and return its upload ID
    async fn create_multipart(&self, key: &str) -> Result<String>;

    /// Upload one part and return its ETag
    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        data: Vec<u8>,
    ) -> Result<String>;

    /// Finish a multipart upload with the ordered part list
    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPartTag],
    ) -> Result<()>;

    /// Abort a multipart upload, discarding uploaded parts
    async fn abort_multipart(&self, key: &str, upload_id: &str) -> Result<()>;

    /// Download `key` into `path`, returning the number of bytes written
    async fn get_to_file(&self, key: &str, path: &Path) -> Result<u64>;
}
