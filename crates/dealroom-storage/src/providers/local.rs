//! Local filesystem storage provider.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use dealroom_core::error::{AppError, ErrorKind};
use dealroom_core::result::AppResult;
use dealroom_core::traits::storage::StorageProvider;

use crate::signed_url::DownloadUrlSigner;

/// Local filesystem storage provider.
///
/// Objects live at `{root}/{bucket}/{path}`. Signed URLs are minted via
/// [`DownloadUrlSigner`] and served by the API's signed-download route.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored objects.
    root: PathBuf,
    /// Signer for download URLs.
    signer: DownloadUrlSigner,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: &str, signer: DownloadUrlSigner) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root, signer })
    }

    /// Resolve a bucket-relative path to an absolute path within the root.
    fn resolve(&self, bucket: &str, path: &str) -> PathBuf {
        let clean = path.trim_start_matches('/');
        self.root.join(bucket).join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn read_bytes(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(bucket, path);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read object: {path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, bucket: &str, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(bucket, path);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write object: {path}"),
                e,
            )
        })?;

        debug!(bucket, path, bytes = data.len(), "Wrote object");
        Ok(())
    }

    async fn delete(&self, bucket: &str, path: &str) -> AppResult<()> {
        let full_path = self.resolve(bucket, path);
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete object: {path}"),
                e,
            )),
        }
    }

    async fn exists(&self, bucket: &str, path: &str) -> AppResult<bool> {
        Ok(self.resolve(bucket, path).exists())
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        self.signer.sign(bucket, path, expires_in)
    }
}
