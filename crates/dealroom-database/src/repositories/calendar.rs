//! Calendar connection repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use dealroom_core::error::{AppError, ErrorKind};
use dealroom_core::result::AppResult;
use dealroom_entity::calendar::CalendarConnection;

use crate::store::CalendarConnectionStore;

/// PostgreSQL-backed [`CalendarConnectionStore`].
#[derive(Debug, Clone)]
pub struct PgCalendarConnectionStore {
    pool: PgPool,
}

impl PgCalendarConnectionStore {
    /// Create a new calendar connection store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalendarConnectionStore for PgCalendarConnectionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CalendarConnection>> {
        sqlx::query_as::<_, CalendarConnection>("SELECT * FROM calendar_connections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find connection", e)
            })
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        provider: &str,
    ) -> AppResult<Option<CalendarConnection>> {
        sqlx::query_as::<_, CalendarConnection>(
            "SELECT * FROM calendar_connections WHERE user_id = $1 AND provider = $2",
        )
        .bind(user_id)
        .bind(provider)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find user connection", e)
        })
    }

    async fn find_by_channel(
        &self,
        channel_id: &str,
        resource_id: &str,
    ) -> AppResult<Option<CalendarConnection>> {
        sqlx::query_as::<_, CalendarConnection>(
            "SELECT * FROM calendar_connections \
             WHERE watch_channel_id = $1 AND watch_resource_id = $2",
        )
        .bind(channel_id)
        .bind(resource_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find connection by channel", e)
        })
    }

    async fn set_watch(
        &self,
        id: Uuid,
        channel_id: &str,
        resource_id: &str,
        expiration: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE calendar_connections \
             SET watch_channel_id = $2, watch_resource_id = $3, watch_expiration = $4 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(channel_id)
        .bind(resource_id)
        .bind(expiration)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record watch", e))?;
        Ok(())
    }

    async fn clear_watch(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE calendar_connections \
             SET watch_channel_id = NULL, watch_resource_id = NULL, watch_expiration = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear watch", e))?;
        Ok(())
    }

    async fn update_access_token(
        &self,
        id: Uuid,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE calendar_connections SET access_token = $2, token_expires_at = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(access_token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update access token", e)
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM calendar_connections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete connection", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_watches_expiring_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarConnection>> {
        sqlx::query_as::<_, CalendarConnection>(
            "SELECT * FROM calendar_connections \
             WHERE watch_channel_id IS NOT NULL AND watch_expiration <= $1",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find expiring watches", e)
        })
    }
}
