//! Resource and document-version repository implementation.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use dealroom_core::error::{AppError, ErrorKind};
use dealroom_core::result::AppResult;
use dealroom_entity::resource::version::PROVISIONAL_STORAGE_PATH;
use dealroom_entity::resource::{DocumentVersion, Resource, VersionMetadata};

use crate::store::ResourceStore;

/// PostgreSQL-backed [`ResourceStore`].
#[derive(Debug, Clone)]
pub struct PgResourceStore {
    pool: PgPool,
}

impl PgResourceStore {
    /// Create a new resource store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceStore for PgResourceStore {
    async fn find_resource(&self, id: Uuid) -> AppResult<Option<Resource>> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find resource", e))
    }

    async fn find_version_by_path(
        &self,
        bucket: &str,
        path: &str,
    ) -> AppResult<Option<(Resource, DocumentVersion)>> {
        let Ok(org_id) = bucket.parse::<Uuid>() else {
            return Ok(None);
        };

        let version = sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE storage_path = $1",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find version by path", e)
        })?;

        let Some(version) = version else {
            return Ok(None);
        };

        let resource = sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE id = $1 AND org_id = $2",
        )
        .bind(version.resource_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find resource", e))?;

        Ok(resource.map(|r| (r, version)))
    }

    async fn find_versions(&self, resource_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE resource_id = $1 ORDER BY version_number DESC",
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    async fn find_version_by_nonce(
        &self,
        resource_id: Uuid,
        nonce: &str,
    ) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE resource_id = $1 AND save_nonce = $2",
        )
        .bind(resource_id)
        .bind(nonce)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find version by nonce", e)
        })
    }

    async fn create_provisional_version(
        &self,
        resource_id: Uuid,
        created_by: Uuid,
        changes_url: Option<&str>,
        save_nonce: &str,
    ) -> AppResult<DocumentVersion> {
        sqlx::query_as::<_, DocumentVersion>(
            "INSERT INTO document_versions \
             (resource_id, created_by, storage_path, status, changes_url, save_nonce, metadata) \
             VALUES ($1, $2, $3, 'active', $4, $5, '{}'::jsonb) RETURNING *",
        )
        .bind(resource_id)
        .bind(created_by)
        .bind(PROVISIONAL_STORAGE_PATH)
        .bind(changes_url)
        .bind(save_nonce)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("document_versions_resource_id_save_nonce_key") =>
            {
                AppError::conflict("A version for this save already exists")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create version", e),
        })
    }

    async fn supersede_other_versions(&self, resource_id: Uuid, keep: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE document_versions SET status = 'superseded' \
             WHERE resource_id = $1 AND id <> $2 AND status = 'active'",
        )
        .bind(resource_id)
        .bind(keep)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to supersede versions", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn finalize_version(
        &self,
        version_id: Uuid,
        storage_path: &str,
        metadata: &VersionMetadata,
    ) -> AppResult<DocumentVersion> {
        let metadata = serde_json::to_value(metadata)?;
        sqlx::query_as::<_, DocumentVersion>(
            "UPDATE document_versions SET storage_path = $2, metadata = $3 \
             WHERE id = $1 RETURNING *",
        )
        .bind(version_id)
        .bind(storage_path)
        .bind(metadata)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to finalize version", e))?
        .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))
    }

    async fn delete_version(&self, version_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM document_versions WHERE id = $1")
            .bind(version_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete version", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn advance_current_version(
        &self,
        resource_id: Uuid,
        version_id: Uuid,
        expected_prior: Option<Uuid>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE resources SET current_version_id = $2, updated_at = NOW() \
             WHERE id = $1 AND current_version_id IS NOT DISTINCT FROM $3",
        )
        .bind(resource_id)
        .bind(version_id)
        .bind(expected_prior)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to advance current version", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn force_current_version(&self, resource_id: Uuid, version_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE resources SET current_version_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(resource_id)
        .bind(version_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to set current version", e)
        })?;
        Ok(())
    }

    async fn acquire_resource_lock(
        &self,
        resource_id: Uuid,
        holder: Uuid,
        lease: Duration,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO resource_locks (resource_id, holder, expires_at) \
             VALUES ($1, $2, NOW() + make_interval(secs => $3)) \
             ON CONFLICT (resource_id) DO UPDATE \
             SET holder = EXCLUDED.holder, expires_at = EXCLUDED.expires_at \
             WHERE resource_locks.expires_at < NOW()",
        )
        .bind(resource_id)
        .bind(holder)
        .bind(lease.as_secs_f64())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire resource lock", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn release_resource_lock(&self, resource_id: Uuid, holder: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM resource_locks WHERE resource_id = $1 AND holder = $2")
            .bind(resource_id)
            .bind(holder)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to release resource lock", e)
            })?;
        Ok(())
    }
}
