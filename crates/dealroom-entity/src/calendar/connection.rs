//! Calendar connection entity — a user's link to an external calendar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One entry of a connection's selectable calendar list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarInList {
    /// Provider calendar id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether this is the account's primary calendar.
    #[serde(default)]
    pub primary: bool,
    /// Whether the user selected this calendar for syncing.
    #[serde(default)]
    pub selected: bool,
}

/// A user's link to an external calendar account.
///
/// Watch identifiers are set on watch registration and cleared on
/// teardown; inbound webhooks are routed back to a connection by the
/// `(watch_channel_id, watch_resource_id)` tuple.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CalendarConnection {
    /// Unique connection identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Provider name (e.g. "google").
    pub provider: String,
    /// Email of the provider account.
    pub provider_email: String,
    /// OAuth access token.
    pub access_token: String,
    /// OAuth refresh token.
    pub refresh_token: String,
    /// When the access token expires.
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Selectable calendars, as a JSON array of [`CalendarInList`].
    pub calendar_list: serde_json::Value,
    /// Whether syncing is enabled for this connection.
    pub sync_enabled: bool,
    /// Active watch channel id, if a watch is registered.
    pub watch_channel_id: Option<String>,
    /// Provider resource id paired with the watch channel.
    pub watch_resource_id: Option<String>,
    /// When the watch channel expires on the provider side.
    pub watch_expiration: Option<DateTime<Utc>>,
    /// When the connection was created.
    pub created_at: DateTime<Utc>,
}

impl CalendarConnection {
    /// The calendar to watch/sync: the primary calendar if present,
    /// otherwise the first selected one, otherwise the provider default.
    pub fn target_calendar_id(&self) -> String {
        let list: Vec<CalendarInList> =
            serde_json::from_value(self.calendar_list.clone()).unwrap_or_default();
        if let Some(primary) = list.iter().find(|c| c.primary) {
            return primary.id.clone();
        }
        if let Some(selected) = list.iter().find(|c| c.selected) {
            return selected.id.clone();
        }
        "primary".to_string()
    }

    /// Whether a watch channel is currently registered.
    pub fn has_watch(&self) -> bool {
        self.watch_channel_id.is_some() && self.watch_resource_id.is_some()
    }
}
