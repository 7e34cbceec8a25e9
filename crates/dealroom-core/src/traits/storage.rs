//! Storage provider trait for pluggable document storage backends.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for document storage backends.
///
/// Implementations exist for the local filesystem and S3. The
/// [`StorageProvider`] trait is defined here in `dealroom-core` and
/// implemented in `dealroom-storage`.
///
/// Every operation is scoped to a `bucket` — in DealRoom a bucket is
/// named after the owning organization id.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read an object into memory as a complete byte vector.
    async fn read_bytes(&self, bucket: &str, path: &str) -> AppResult<Bytes>;

    /// Write bytes to an object at the given path.
    async fn write(&self, bucket: &str, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete an object at the given path.
    async fn delete(&self, bucket: &str, path: &str) -> AppResult<()>;

    /// Check whether an object exists at the given path.
    async fn exists(&self, bucket: &str, path: &str) -> AppResult<bool>;

    /// Mint a time-bounded signed URL granting read access to an object.
    async fn signed_url(&self, bucket: &str, path: &str, expires_in: Duration)
    -> AppResult<String>;
}
