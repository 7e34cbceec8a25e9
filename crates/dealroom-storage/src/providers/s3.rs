//! S3-compatible object storage provider.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::debug;

use dealroom_core::config::storage::S3Config;
use dealroom_core::error::{AppError, ErrorKind};
use dealroom_core::result::AppResult;
use dealroom_core::traits::storage::StorageProvider;

/// S3-compatible storage provider.
///
/// Buckets map one-to-one onto DealRoom organization buckets. Signed
/// content URLs are native presigned GETs.
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: Client,
}

impl S3StorageProvider {
    /// Create a new S3 storage provider from configuration.
    ///
    /// Credentials come from the standard AWS environment/profile chain.
    pub async fn new(config: &S3Config) -> AppResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if !config.region.is_empty() {
            loader = loader.region(Region::new(config.region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        debug!(region = %config.region, "Initialized S3 storage provider");
        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }
}

#[async_trait]
impl StorageProvider for S3StorageProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client
            .list_buckets()
            .send()
            .await
            .map(|_| true)
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "S3 health check failed", e))
    }

    async fn read_bytes(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|s| s.is_no_such_key()) == Some(true) {
                    AppError::not_found(format!("Object not found: {path}"))
                } else {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to read object: {path}"),
                        e,
                    )
                }
            })?;

        let data = output.body.collect().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to collect object body: {path}"),
                e,
            )
        })?;
        Ok(data.into_bytes())
    }

    async fn write(&self, bucket: &str, path: &str, data: Bytes) -> AppResult<()> {
        let len = data.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(path)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write object: {path}"),
                    e,
                )
            })?;

        debug!(bucket, path, bytes = len, "Wrote object");
        Ok(())
    }

    async fn delete(&self, bucket: &str, path: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete object: {path}"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn exists(&self, bucket: &str, path: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(path)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().map(|s| s.is_not_found()) == Some(true) => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat object: {path}"),
                e,
            )),
        }
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Invalid presign expiry", e)
        })?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(path)
            .presigned(presigning)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Failed to presign URL for: {path}"),
                    e,
                )
            })?;

        Ok(presigned.uri().to_string())
    }
}
