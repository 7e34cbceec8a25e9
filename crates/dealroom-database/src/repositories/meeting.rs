//! Meeting and participant repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use dealroom_core::error::{AppError, ErrorKind};
use dealroom_core::result::AppResult;
use dealroom_entity::meeting::{Meeting, MeetingParticipant, ResponseStatus};

use crate::store::MeetingStore;

/// PostgreSQL-backed [`MeetingStore`].
#[derive(Debug, Clone)]
pub struct PgMeetingStore {
    pool: PgPool,
}

impl PgMeetingStore {
    /// Create a new meeting store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeetingStore for PgMeetingStore {
    async fn find_meeting(&self, id: Uuid) -> AppResult<Option<Meeting>> {
        sqlx::query_as::<_, Meeting>("SELECT * FROM meetings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find meeting", e))
    }

    async fn find_meetings_by_event_ids(&self, event_ids: &[String]) -> AppResult<Vec<Meeting>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        // jsonb_exists_any matches array elements and (for legacy rows)
        // bare string values.
        sqlx::query_as::<_, Meeting>(
            "SELECT * FROM meetings WHERE jsonb_exists_any(calendar_event_ids, $1)",
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find meetings by event", e)
        })
    }

    async fn list_participants(&self, meeting_id: Uuid) -> AppResult<Vec<MeetingParticipant>> {
        sqlx::query_as::<_, MeetingParticipant>(
            "SELECT * FROM meeting_participants WHERE meeting_id = $1",
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list participants", e))
    }

    async fn find_participant(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<MeetingParticipant>> {
        sqlx::query_as::<_, MeetingParticipant>(
            "SELECT * FROM meeting_participants WHERE meeting_id = $1 AND user_id = $2",
        )
        .bind(meeting_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find participant", e))
    }

    async fn record_participant_response(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
        status: ResponseStatus,
        responded_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE meeting_participants SET response_status = $3, responded_at = $4 \
             WHERE meeting_id = $1 AND user_id = $2",
        )
        .bind(meeting_id)
        .bind(user_id)
        .bind(status)
        .bind(responded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record response", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn reconcile_participant_response(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
        status: ResponseStatus,
        responded_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE meeting_participants SET response_status = $3, responded_at = $4 \
             WHERE meeting_id = $1 AND user_id = $2 AND response_status <> $3",
        )
        .bind(meeting_id)
        .bind(user_id)
        .bind(status)
        .bind(responded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to reconcile response", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn reset_non_organizer_responses(
        &self,
        meeting_id: Uuid,
        organizer_id: Uuid,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE meeting_participants SET response_status = 'pending', responded_at = NULL \
             WHERE meeting_id = $1 AND user_id <> $2",
        )
        .bind(meeting_id)
        .bind(organizer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset responses", e))?;
        Ok(result.rows_affected())
    }

    async fn update_meeting_window(
        &self,
        meeting_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<Meeting> {
        sqlx::query_as::<_, Meeting>(
            "UPDATE meetings SET start_time = $2, end_time = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(meeting_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reschedule meeting", e))?
        .ok_or_else(|| AppError::not_found(format!("Meeting {meeting_id} not found")))
    }
}
