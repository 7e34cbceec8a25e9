//! Store traits — the seam between services and persistence.
//!
//! Services receive these as `Arc<dyn …Store>`; the PostgreSQL
//! implementations live in [`crate::repositories`] and tests substitute
//! in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use dealroom_core::result::AppResult;
use dealroom_entity::calendar::CalendarConnection;
use dealroom_entity::meeting::{Meeting, MeetingParticipant, ResponseStatus};
use dealroom_entity::resource::{DocumentVersion, Resource, VersionMetadata};

/// Persistence operations for resources, document versions, and the
/// per-resource commit lock.
#[async_trait]
pub trait ResourceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a resource by id.
    async fn find_resource(&self, id: Uuid) -> AppResult<Option<Resource>>;

    /// Resolve a storage path within a bucket to its version and owning
    /// resource.
    async fn find_version_by_path(
        &self,
        bucket: &str,
        path: &str,
    ) -> AppResult<Option<(Resource, DocumentVersion)>>;

    /// List all versions of a resource, newest first.
    async fn find_versions(&self, resource_id: Uuid) -> AppResult<Vec<DocumentVersion>>;

    /// Find the version created by a prior callback with this save nonce,
    /// if any (idempotency lookup).
    async fn find_version_by_nonce(
        &self,
        resource_id: Uuid,
        nonce: &str,
    ) -> AppResult<Option<DocumentVersion>>;

    /// Insert a provisional version row. The version number is assigned
    /// by the storage layer; the returned row carries it.
    async fn create_provisional_version(
        &self,
        resource_id: Uuid,
        created_by: Uuid,
        changes_url: Option<&str>,
        save_nonce: &str,
    ) -> AppResult<DocumentVersion>;

    /// Mark every version of the resource except `keep` as superseded.
    /// Returns the number of versions updated.
    async fn supersede_other_versions(&self, resource_id: Uuid, keep: Uuid) -> AppResult<u64>;

    /// Finalize a provisional version with its durable storage path and
    /// fetch metadata.
    async fn finalize_version(
        &self,
        version_id: Uuid,
        storage_path: &str,
        metadata: &VersionMetadata,
    ) -> AppResult<DocumentVersion>;

    /// Delete a version row (compensation for a failed commit).
    async fn delete_version(&self, version_id: Uuid) -> AppResult<bool>;

    /// Advance the resource's current-version pointer, but only if it
    /// still references `expected_prior`. Returns `false` when the
    /// optimistic check detects a concurrent advance.
    async fn advance_current_version(
        &self,
        resource_id: Uuid,
        version_id: Uuid,
        expected_prior: Option<Uuid>,
    ) -> AppResult<bool>;

    /// Unconditionally set the current-version pointer.
    async fn force_current_version(&self, resource_id: Uuid, version_id: Uuid) -> AppResult<()>;

    /// Try to take the per-resource commit lease. Returns `false` when
    /// another live holder has it.
    async fn acquire_resource_lock(
        &self,
        resource_id: Uuid,
        holder: Uuid,
        lease: Duration,
    ) -> AppResult<bool>;

    /// Release the commit lease if `holder` still owns it.
    async fn release_resource_lock(&self, resource_id: Uuid, holder: Uuid) -> AppResult<()>;
}

/// Persistence operations for calendar connections and their watch
/// channels.
#[async_trait]
pub trait CalendarConnectionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a connection by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CalendarConnection>>;

    /// Find a user's connection for a provider.
    async fn find_by_user(
        &self,
        user_id: Uuid,
        provider: &str,
    ) -> AppResult<Option<CalendarConnection>>;

    /// Route an inbound webhook back to its connection.
    async fn find_by_channel(
        &self,
        channel_id: &str,
        resource_id: &str,
    ) -> AppResult<Option<CalendarConnection>>;

    /// Record a freshly registered watch channel.
    async fn set_watch(
        &self,
        id: Uuid,
        channel_id: &str,
        resource_id: &str,
        expiration: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Clear the watch identifiers after teardown.
    async fn clear_watch(&self, id: Uuid) -> AppResult<()>;

    /// Persist a refreshed OAuth access token.
    async fn update_access_token(
        &self,
        id: Uuid,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Delete a connection. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Connections whose watch expires before the cutoff (renewal scan).
    async fn find_watches_expiring_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarConnection>>;
}

/// Persistence operations for meetings and participant responses.
#[async_trait]
pub trait MeetingStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a meeting by id.
    async fn find_meeting(&self, id: Uuid) -> AppResult<Option<Meeting>>;

    /// Meetings referencing any of the given external event ids.
    async fn find_meetings_by_event_ids(&self, event_ids: &[String]) -> AppResult<Vec<Meeting>>;

    /// All participants of a meeting.
    async fn list_participants(&self, meeting_id: Uuid) -> AppResult<Vec<MeetingParticipant>>;

    /// A single participant row.
    async fn find_participant(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<MeetingParticipant>>;

    /// Record an explicit response from the participant themselves.
    /// Returns `false` when no such participant row exists.
    async fn record_participant_response(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
        status: ResponseStatus,
        responded_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Apply a reconciled response state. A write that would not change
    /// the stored status is skipped; returns `true` only when a row
    /// actually changed.
    async fn reconcile_participant_response(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
        status: ResponseStatus,
        responded_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Reset every non-organizer participant to pending (reschedule).
    /// Returns the number of participants reset.
    async fn reset_non_organizer_responses(
        &self,
        meeting_id: Uuid,
        organizer_id: Uuid,
    ) -> AppResult<u64>;

    /// Move the meeting's time window.
    async fn update_meeting_window(
        &self,
        meeting_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<Meeting>;
}
