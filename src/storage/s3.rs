//! S3 (and S3-compatible) backend built on `aws-sdk-s3`.

use super::{CompletedPartTag, ObjectStore};
use crate::config::{ENV_AWS_ACCESS_KEY, ENV_AWS_SECRET_KEY, ENV_S3_BUCKET, StorageConfig};
use crate::error::{Error, ObjectStoreError, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::{CompletedMultipartUpload, CompletedPart},
};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Object store backed by an S3 bucket
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a client from explicit credentials
    ///
    /// Fails with [`Error::Config`] when the bucket or either credential is empty.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        for (key, value) in [
            (ENV_AWS_ACCESS_KEY, &config.access_key_id),
            (ENV_AWS_SECRET_KEY, &config.secret_access_key),
            (ENV_S3_BUCKET, &config.bucket),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(
                    key,
                    "object store credentials and bucket name are required",
                ));
            }
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "yt-seo-etl-env",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .behavior_version_latest();

        // Custom endpoints (MinIO, R2) need path-style addressing
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }

    fn request_failed<E>(&self, operation: &'static str, key: &str, err: E) -> Error
    where
        E: std::error::Error,
    {
        Error::ObjectStore(ObjectStoreError::RequestFailed {
            operation,
            bucket: self.bucket.clone(),
            key: key.to_string(),
            reason: DisplayErrorContext(&err).to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(aws_sdk_s3::operation::head_object::HeadObjectError::is_not_found)
                {
                    return Ok(false);
                }
                tracing::error!(key, error = %DisplayErrorContext(&err), "Error checking if object exists");
                Err(self.request_failed("head_object", key, err))
            }
        }
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| self.request_failed("put_object", key, e))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| self.request_failed("put_object", key, e))?;

        Ok(())
    }

    async fn create_multipart(&self, key: &str) -> Result<String> {
        let output = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| self.request_failed("create_multipart_upload", key, e))?;

        output.upload_id().map(str::to_string).ok_or_else(|| {
            Error::ObjectStore(ObjectStoreError::MissingField {
                operation: "create_multipart_upload",
                key: key.to_string(),
                field: "upload_id",
            })
        })
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        data: Vec<u8>,
    ) -> Result<String> {
        let output = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| self.request_failed("upload_part", key, e))?;

        output.e_tag().map(str::to_string).ok_or_else(|| {
            Error::ObjectStore(ObjectStoreError::MissingField {
                operation: "upload_part",
                key: key.to_string(),
                field: "e_tag",
            })
        })
    }

    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPartTag],
    ) -> Result<()> {
        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(
                parts
                    .iter()
                    .map(|p| {
                        CompletedPart::builder()
                            .e_tag(&p.etag)
                            .part_number(p.part_number)
                            .build()
                    })
                    .collect(),
            ))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|e| self.request_failed("complete_multipart_upload", key, e))?;

        Ok(())
    }

    async fn abort_multipart(&self, key: &str, upload_id: &str) -> Result<()> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| self.request_failed("abort_multipart_upload", key, e))?;

        Ok(())
    }

    async fn get_to_file(&self, key: &str, path: &Path) -> Result<u64> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(aws_sdk_s3::operation::get_object::GetObjectError::is_no_such_key)
                {
                    return Err(Error::ObjectStore(ObjectStoreError::NotFound {
                        bucket: self.bucket.clone(),
                        key: key.to_string(),
                    }));
                }
                return Err(self.request_failed("get_object", key, err));
            }
        };

        write_body(output.body.into_async_read(), path)
            .await
            .map_err(|e| self.request_failed("get_object", key, e))
    }
}

/// Stream `reader` into a new file at `path`
///
/// A partially written file is removed when the copy fails.
async fn write_body<R>(mut reader: R, path: &Path) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut file = tokio::fs::File::create(path).await?;
    let result: std::io::Result<u64> = async {
        let written = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;
        Ok(written)
    }
    .await;

    if result.is_err() {
        drop(file);
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "could not remove partial download");
        }
    }
    result
}
