//! Idempotent upload of local artifacts, plus download by key.

use super::{CompletedPartTag, ObjectStore};
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, warn};

/// Result of [`ObjectStoreWriter::upload_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Object already existed; nothing was sent
    Skipped {
        /// Object key
        key: String,
    },
    /// Object was written
    Uploaded {
        /// Object key
        key: String,
        /// Bytes sent
        bytes: u64,
        /// Number of multipart parts (0 for a single-shot put)
        parts: usize,
    },
}

impl UploadOutcome {
    /// Object key the outcome refers to
    pub fn key(&self) -> &str {
        match self {
            UploadOutcome::Skipped { key } | UploadOutcome::Uploaded { key, .. } => key,
        }
    }
}

/// State of one multipart upload
///
/// Lives only for the duration of [`ObjectStoreWriter::upload_file`] and is
/// always closed by complete or abort.
#[derive(Debug, Clone)]
pub struct UploadSession {
    /// Object key
    pub key: String,
    /// Upload ID issued by the store
    pub upload_id: String,
    /// Parts uploaded so far, in order
    pub parts: Vec<CompletedPartTag>,
    /// Bytes uploaded so far
    pub bytes_transferred: u64,
}

/// Writes artifacts to an [`ObjectStore`] without overwriting existing objects
pub struct ObjectStoreWriter<S> {
    store: S,
    multipart_threshold: u64,
    part_size: u64,
}

impl<S: ObjectStore> ObjectStoreWriter<S> {
    /// Create a writer using the threshold and part size from `config`
    pub fn new(store: S, config: &StorageConfig) -> Self {
        Self::with_limits(store, config.multipart_threshold, config.part_size)
    }

    /// Create a writer with explicit multipart limits
    pub fn with_limits(store: S, multipart_threshold: u64, part_size: u64) -> Self {
        Self {
            store,
            multipart_threshold,
            part_size: part_size.max(1),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Upload `path` unless an object with the same key already exists
    ///
    /// The key defaults to the file's base name. Files larger than the
    /// multipart threshold are sent in parts; a failed multipart upload is
    /// aborted before the error is returned.
    pub async fn upload_file(&self, path: &Path, key: Option<&str>) -> Result<UploadOutcome> {
        let key = match key {
            Some(key) => key.to_string(),
            None => base_name(path)?,
        };
        let bucket = self.store.bucket();

        if self.store.exists(&key).await? {
            info!(bucket, key = %key, "Object already exists, skipping upload");
            return Ok(UploadOutcome::Skipped { key });
        }

        let size = tokio::fs::metadata(path).await?.len();

        if size > self.multipart_threshold {
            info!(bucket, key = %key, size, part_size = self.part_size, "Starting multipart upload");
            let session = self.upload_multipart(path, &key).await?;
            info!(
                bucket,
                key = %key,
                parts = session.parts.len(),
                bytes = session.bytes_transferred,
                "Multipart upload completed"
            );
            Ok(UploadOutcome::Uploaded {
                key,
                bytes: session.bytes_transferred,
                parts: session.parts.len(),
            })
        } else {
            self.store.put_file(&key, path).await?;
            info!(bucket, key = %key, size, "Uploaded object");
            Ok(UploadOutcome::Uploaded {
                key,
                bytes: size,
                parts: 0,
            })
        }
    }

    async fn upload_multipart(&self, path: &Path, key: &str) -> Result<UploadSession> {
        let upload_id = self.store.create_multipart(key).await?;
        let mut session = UploadSession {
            key: key.to_string(),
            upload_id,
            parts: Vec::new(),
            bytes_transferred: 0,
        };

        match self.send_parts(path, &mut session).await {
            Ok(()) => Ok(session),
            Err(source) => {
                warn!(
                    key,
                    upload_id = %session.upload_id,
                    parts_uploaded = session.parts.len(),
                    error = %source,
                    "Multipart upload failed, aborting"
                );
                let abort_error = match self.store.abort_multipart(key, &session.upload_id).await
                {
                    Ok(()) => None,
                    Err(e) => {
                        error!(key, upload_id = %session.upload_id, error = %e, "Abort failed");
                        Some(Box::new(e))
                    }
                };
                Err(Error::UploadSession {
                    key: session.key,
                    upload_id: session.upload_id,
                    source: Box::new(source),
                    abort_error,
                })
            }
        }
    }

    async fn send_parts(&self, path: &Path, session: &mut UploadSession) -> Result<()> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut part_number: i32 = 1;

        loop {
            let mut chunk = Vec::new();
            (&mut file).take(self.part_size).read_to_end(&mut chunk).await?;
            if chunk.is_empty() {
                break;
            }

            let len = chunk.len() as u64;
            let etag = self
                .store
                .upload_part(&session.key, &session.upload_id, part_number, chunk)
                .await?;
            debug!(key = %session.key, part_number, len, "Uploaded part");

            session.parts.push(CompletedPartTag { part_number, etag });
            session.bytes_transferred += len;
            part_number += 1;
        }

        self.store
            .complete_multipart(&session.key, &session.upload_id, &session.parts)
            .await
    }

    /// Download `key` to `dest`, or to the key's base name in the working directory
    pub async fn download_file(&self, key: &str, dest: Option<&Path>) -> Result<PathBuf> {
        let dest = match dest {
            Some(dest) => dest.to_path_buf(),
            None => PathBuf::from(base_name(Path::new(key))?),
        };

        let bytes = self.store.get_to_file(key, &dest).await?;
        info!(bucket = self.store.bucket(), key, dest = %dest.display(), bytes, "Downloaded object");
        Ok(dest)
    }
}

fn base_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            ))
        })
}
