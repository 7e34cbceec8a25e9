//! Storage manager — selects and fronts the configured provider.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::info;

use dealroom_core::config::storage::StorageConfig;
use dealroom_core::error::AppError;
use dealroom_core::result::AppResult;
use dealroom_core::traits::storage::StorageProvider;

use crate::providers::{LocalStorageProvider, S3StorageProvider};
use crate::signed_url::DownloadUrlSigner;

/// Fronts the configured [`StorageProvider`] implementation.
///
/// Services talk to the manager rather than a concrete provider so that
/// tests can construct one over any provider (usually a temp-dir local
/// provider).
#[derive(Debug, Clone)]
pub struct StorageManager {
    provider: Arc<dyn StorageProvider>,
    signed_url_ttl: Duration,
}

impl StorageManager {
    /// Initialize the provider named by configuration.
    pub async fn new(config: &StorageConfig, signer: DownloadUrlSigner) -> AppResult<Self> {
        let provider: Arc<dyn StorageProvider> = match config.provider.as_str() {
            "local" => Arc::new(LocalStorageProvider::new(&config.data_root, signer).await?),
            "s3" => Arc::new(S3StorageProvider::new(&config.s3).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: {other}"
                )));
            }
        };

        info!(provider = provider.provider_type(), "Storage initialized");
        Ok(Self {
            provider,
            signed_url_ttl: Duration::from_secs(config.signed_url_ttl_seconds),
        })
    }

    /// Build a manager over an existing provider (used by tests).
    pub fn with_provider(provider: Arc<dyn StorageProvider>, signed_url_ttl: Duration) -> Self {
        Self {
            provider,
            signed_url_ttl,
        }
    }

    /// The active provider's type name.
    pub fn provider_type(&self) -> &str {
        self.provider.provider_type()
    }

    /// Check provider health.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.provider.health_check().await
    }

    /// Read an object into memory.
    pub async fn read_bytes(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        self.provider.read_bytes(bucket, path).await
    }

    /// Write an object.
    pub async fn write(&self, bucket: &str, path: &str, data: Bytes) -> AppResult<()> {
        self.provider.write(bucket, path, data).await
    }

    /// Delete an object.
    pub async fn delete(&self, bucket: &str, path: &str) -> AppResult<()> {
        self.provider.delete(bucket, path).await
    }

    /// Check object existence.
    pub async fn exists(&self, bucket: &str, path: &str) -> AppResult<bool> {
        self.provider.exists(bucket, path).await
    }

    /// Mint a signed content URL with the configured TTL.
    pub async fn signed_url(&self, bucket: &str, path: &str) -> AppResult<String> {
        self.provider
            .signed_url(bucket, path, self.signed_url_ttl)
            .await
    }

    /// The configured signed-URL lifetime.
    pub fn signed_url_ttl(&self) -> Duration {
        self.signed_url_ttl
    }
}
