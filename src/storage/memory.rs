//! In-memory object store used for dry runs and tests.

use super::{CompletedPartTag, ObjectStore};
use crate::error::{Error, ObjectStoreError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A store call, recorded in the order it was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// Existence check
    Exists(String),
    /// Single-shot upload
    Put(String),
    /// Multipart session created
    CreateMultipart(String),
    /// One part uploaded
    UploadPart {
        /// Upload session
        upload_id: String,
        /// Part number
        part_number: i32,
        /// Bytes in the part
        len: usize,
    },
    /// Session completed with these part numbers
    CompleteMultipart {
        /// Upload session
        upload_id: String,
        /// Part numbers in the submitted order
        part_numbers: Vec<i32>,
    },
    /// Session aborted
    AbortMultipart(String),
    /// Download
    Get(String),
}

/// Operations that can be made to fail on purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// [`ObjectStore::exists`]
    Exists,
    /// [`ObjectStore::put_file`]
    Put,
    /// [`ObjectStore::upload_part`] for the given part number
    UploadPart(i32),
    /// [`ObjectStore::complete_multipart`]
    CompleteMultipart,
    /// [`ObjectStore::abort_multipart`]
    AbortMultipart,
}

#[derive(Default)]
struct State {
    objects: HashMap<String, Vec<u8>>,
    // upload_id -> (key, part_number -> bytes)
    uploads: HashMap<String, (String, BTreeMap<i32, Vec<u8>>)>,
    next_upload: u64,
    calls: Vec<StoreCall>,
    failures: Vec<StoreOperation>,
}

/// Object store that keeps objects in a map
///
/// Records every call so callers can assert on the exact protocol sequence,
/// and can be told to fail specific operations.
pub struct MemoryObjectStore {
    bucket: String,
    state: Mutex<State>,
}

impl MemoryObjectStore {
    /// Create an empty store
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Insert an object directly
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.lock().objects.insert(key.into(), data.into());
    }

    /// Contents of an object, if present
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(key).cloned()
    }

    /// Calls made so far, oldest first
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Number of multipart sessions that are neither completed nor aborted
    pub fn open_uploads(&self) -> usize {
        self.lock().uploads.len()
    }

    /// Make every future call of `operation` fail
    pub fn fail_on(&self, operation: StoreOperation) {
        self.lock().failures.push(operation);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked mid-call
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, state: &State, operation: StoreOperation, key: &str) -> Result<()> {
        if state.failures.contains(&operation) {
            return Err(Error::ObjectStore(ObjectStoreError::RequestFailed {
                operation: operation_name(operation),
                bucket: self.bucket.clone(),
                key: key.to_string(),
                reason: "injected failure".to_string(),
            }));
        }
        Ok(())
    }

    fn no_such_upload(&self, key: &str, operation: &'static str) -> Error {
        Error::ObjectStore(ObjectStoreError::RequestFailed {
            operation,
            bucket: self.bucket.clone(),
            key: key.to_string(),
            reason: "no such upload".to_string(),
        })
    }
}

fn operation_name(operation: StoreOperation) -> &'static str {
    match operation {
        StoreOperation::Exists => "head_object",
        StoreOperation::Put => "put_object",
        StoreOperation::UploadPart(_) => "upload_part",
        StoreOperation::CompleteMultipart => "complete_multipart_upload",
        StoreOperation::AbortMultipart => "abort_multipart_upload",
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Exists(key.to_string()));
        self.check(&state, StoreOperation::Exists, key)?;
        Ok(state.objects.contains_key(key))
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        let data = tokio::fs::read(path).await?;
        let mut state = self.lock();
        state.calls.push(StoreCall::Put(key.to_string()));
        self.check(&state, StoreOperation::Put, key)?;
        state.objects.insert(key.to_string(), data);
        Ok(())
    }

    async fn create_multipart(&self, key: &str) -> Result<String> {
        let mut state = self.lock();
        state.next_upload += 1;
        let upload_id = format!("upload-{}", state.next_upload);
        state.calls.push(StoreCall::CreateMultipart(key.to_string()));
        state
            .uploads
            .insert(upload_id.clone(), (key.to_string(), BTreeMap::new()));
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        data: Vec<u8>,
    ) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(StoreCall::UploadPart {
            upload_id: upload_id.to_string(),
            part_number,
            len: data.len(),
        });
        self.check(&state, StoreOperation::UploadPart(part_number), key)?;

        let (_, parts) = state
            .uploads
            .get_mut(upload_id)
            .ok_or_else(|| self.no_such_upload(key, "upload_part"))?;
        parts.insert(part_number, data);
        Ok(format!("\"etag-{upload_id}-{part_number}\""))
    }

    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPartTag],
    ) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(StoreCall::CompleteMultipart {
            upload_id: upload_id.to_string(),
            part_numbers: parts.iter().map(|p| p.part_number).collect(),
        });
        self.check(&state, StoreOperation::CompleteMultipart, key)?;

        let (object_key, uploaded) = state
            .uploads
            .remove(upload_id)
            .ok_or_else(|| self.no_such_upload(key, "complete_multipart_upload"))?;

        let mut data = Vec::new();
        for part in parts {
            let bytes = uploaded
                .get(&part.part_number)
                .ok_or_else(|| self.no_such_upload(key, "complete_multipart_upload"))?;
            data.extend_from_slice(bytes);
        }
        state.objects.insert(object_key, data);
        Ok(())
    }

    async fn abort_multipart(&self, key: &str, upload_id: &str) -> Result<()> {
        let mut state = self.lock();
        state
            .calls
            .push(StoreCall::AbortMultipart(upload_id.to_string()));
        self.check(&state, StoreOperation::AbortMultipart, key)?;
        state.uploads.remove(upload_id);
        Ok(())
    }

    async fn get_to_file(&self, key: &str, path: &Path) -> Result<u64> {
        let data = {
            let mut state = self.lock();
            state.calls.push(StoreCall::Get(key.to_string()));
            state.objects.get(key).cloned()
        };
        let data = data.ok_or_else(|| {
            Error::ObjectStore(ObjectStoreError::NotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            })
        })?;
        tokio::fs::write(path, &data).await?;
        Ok(data.len() as u64)
    }
}
