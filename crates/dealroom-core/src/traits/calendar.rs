//! Calendar provider trait for external calendar integrations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;

/// A registered push-notification channel on a remote calendar.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WatchChannel {
    /// Channel id chosen by us at registration time.
    pub channel_id: String,
    /// Opaque resource id assigned by the provider.
    pub resource_id: String,
    /// When the channel expires on the provider side.
    pub expiration: DateTime<Utc>,
}

/// An attendee of a remote calendar event.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RemoteAttendee {
    /// Attendee email address.
    pub email: String,
    /// Provider response state: `needsAction`, `accepted`, `declined`,
    /// or `tentative`.
    pub response_status: String,
}

/// A remote calendar event, reduced to the fields reconciliation needs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RemoteEvent {
    /// Provider-assigned event id.
    pub id: String,
    /// Current attendee list with response states.
    pub attendees: Vec<RemoteAttendee>,
}

/// A freshly minted OAuth access token.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    /// The new access token.
    pub access_token: String,
    /// When it expires.
    pub expires_at: DateTime<Utc>,
}

/// Trait for external calendar providers.
///
/// Defined here so services depend on the seam rather than a concrete
/// provider; `dealroom-calendar` implements it for Google Calendar and
/// tests substitute a scripted fake.
#[async_trait]
pub trait CalendarProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Provider name (e.g., "google").
    fn provider_name(&self) -> &str;

    /// Exchange a refresh token for a new access token.
    async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<RefreshedToken>;

    /// Register a push-notification channel for a calendar's events.
    async fn watch_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        channel_id: &str,
        webhook_url: &str,
        expiration: DateTime<Utc>,
    ) -> AppResult<WatchChannel>;

    /// Tear down a previously registered channel.
    async fn stop_watch(
        &self,
        access_token: &str,
        channel_id: &str,
        resource_id: &str,
    ) -> AppResult<()>;

    /// List upcoming events (with attendees) for a calendar.
    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
    ) -> AppResult<Vec<RemoteEvent>>;

    /// Fetch a single event, or `None` if the provider no longer has it.
    async fn get_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> AppResult<Option<RemoteEvent>>;

    /// Replace the attendee list of an event (used to push a response
    /// status change back to the provider).
    async fn patch_event_attendees(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        attendees: &[RemoteAttendee],
    ) -> AppResult<()>;
}
