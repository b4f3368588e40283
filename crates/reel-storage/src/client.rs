//! S3 client implementation.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::SdkConfig;
use tracing::{debug, info};

use crate::blob::BlobStore;
use crate::error::{StorageError, StorageResult};

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket name
    pub bucket_name: String,
    /// Custom endpoint (S3-compatible stores, localstack)
    pub endpoint_url: Option<String>,
    /// Path-style addressing (needed by most S3-compatible endpoints)
    pub force_path_style: bool,
}

impl S3Config {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            endpoint_url: None,
            force_path_style: false,
        }
    }

    /// Talk to an S3-compatible endpoint with path-style addressing.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self.force_path_style = true;
        self
    }
}

/// S3 blob store client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from a loaded SDK configuration.
    pub fn new(sdk_config: &SdkConfig, config: S3Config) -> StorageResult<Self> {
        if config.bucket_name.trim().is_empty() {
            return Err(StorageError::config_error("bucket name is empty"));
        }

        let mut builder = Builder::from(sdk_config).force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        let s3_config = builder.build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket_name,
        })
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                StorageError::config_error(format!(
                    "S3 connectivity check failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for S3Client {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload_file(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()> {
        debug!("Uploading {} to s3://{}/{}", path.display(), self.bucket, key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(DisplayErrorContext(&e).to_string()))?;

        info!("Uploaded {} to s3://{}/{}", path.display(), self.bucket, key);
        Ok(())
    }

    async fn upload_bytes(&self, data: Vec<u8>, key: &str, content_type: &str) -> StorageResult<()> {
        debug!("Uploading {} bytes to s3://{}/{}", data.len(), self.bucket, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn download_bytes(&self, key: &str) -> StorageResult<Vec<u8>> {
        debug!("Downloading s3://{}/{}", self.bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                    StorageError::not_found(key)
                } else {
                    StorageError::download_failed(DisplayErrorContext(&e).to_string())
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::download_failed(e.to_string()))?
            .into_bytes()
            .to_vec();

        info!("Downloaded {} bytes from s3://{}/{}", bytes.len(), self.bucket, key);
        Ok(bytes)
    }
}
