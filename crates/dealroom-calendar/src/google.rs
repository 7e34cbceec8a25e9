//! Google Calendar API client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::debug;

use dealroom_core::config::calendar::CalendarConfig;
use dealroom_core::error::{AppError, ErrorKind};
use dealroom_core::result::AppResult;
use dealroom_core::traits::calendar::{
    CalendarProvider, RefreshedToken, RemoteAttendee, RemoteEvent, WatchChannel,
};

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Timeout applied to every provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Google Calendar implementation of [`CalendarProvider`].
#[derive(Debug, Clone)]
pub struct GoogleCalendarProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchResponse {
    resource_id: String,
    /// Milliseconds since epoch, serialized as a string.
    expiration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventAttendee {
    #[serde(default)]
    email: String,
    #[serde(default)]
    response_status: String,
}

#[derive(Debug, Deserialize)]
struct Event {
    id: String,
    #[serde(default)]
    attendees: Vec<EventAttendee>,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<Event>,
}

impl GoogleCalendarProvider {
    /// Create a provider from calendar configuration.
    pub fn new(config: &CalendarConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    fn events_url(calendar_id: &str) -> String {
        format!("{CALENDAR_API}/calendars/{calendar_id}/events")
    }
}

impl From<Event> for RemoteEvent {
    fn from(event: Event) -> Self {
        RemoteEvent {
            id: event.id,
            attendees: event
                .attendees
                .into_iter()
                .filter(|a| !a.email.is_empty())
                .map(|a| RemoteAttendee {
                    email: a.email,
                    response_status: a.response_status,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<RefreshedToken> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(AppError::configuration("Missing Google OAuth credentials"));
        }

        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Token refresh request failed", e)
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Failed to refresh token: {}",
                response.status()
            )));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Malformed token response", e)
        })?;

        debug!("Access token refreshed");
        Ok(RefreshedToken {
            access_token: tokens.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(tokens.expires_in),
        })
    }

    async fn watch_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        channel_id: &str,
        webhook_url: &str,
        expiration: DateTime<Utc>,
    ) -> AppResult<WatchChannel> {
        let response = self
            .http
            .post(format!("{}/watch", Self::events_url(calendar_id)))
            .bearer_auth(access_token)
            .json(&serde_json::json!({
                "id": channel_id,
                "type": "web_hook",
                "address": webhook_url,
                "expiration": expiration.timestamp_millis(),
            }))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Watch request failed", e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(format!(
                "Failed to set up calendar watch: {status} {body}"
            )));
        }

        let watch: WatchResponse = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Malformed watch response", e)
        })?;

        let expiration_ms: i64 = watch.expiration.parse().map_err(|_| {
            AppError::external_service("Watch response carried a non-numeric expiration")
        })?;
        let expiration = Utc
            .timestamp_millis_opt(expiration_ms)
            .single()
            .ok_or_else(|| {
                AppError::external_service("Watch response carried an invalid expiration")
            })?;

        Ok(WatchChannel {
            channel_id: channel_id.to_string(),
            resource_id: watch.resource_id,
            expiration,
        })
    }

    async fn stop_watch(
        &self,
        access_token: &str,
        channel_id: &str,
        resource_id: &str,
    ) -> AppResult<()> {
        let response = self
            .http
            .post(format!("{CALENDAR_API}/channels/stop"))
            .bearer_auth(access_token)
            .json(&serde_json::json!({
                "id": channel_id,
                "resourceId": resource_id,
            }))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Stop-watch request failed", e)
            })?;

        // 404 means the channel already expired server-side.
        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(AppError::external_service(format!(
                "Failed to stop watch: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
    ) -> AppResult<Vec<RemoteEvent>> {
        let time_min = Utc::now().to_rfc3339();
        let response = self
            .http
            .get(Self::events_url(calendar_id))
            .bearer_auth(access_token)
            .query(&[
                ("singleEvents", "true"),
                ("maxResults", "250"),
                ("timeMin", time_min.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Event list request failed", e)
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Failed to list events: {}",
                response.status()
            )));
        }

        let list: EventList = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Malformed event list", e)
        })?;

        Ok(list.items.into_iter().map(RemoteEvent::from).collect())
    }

    async fn get_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> AppResult<Option<RemoteEvent>> {
        let response = self
            .http
            .get(format!("{}/{event_id}", Self::events_url(calendar_id)))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Event fetch failed", e)
            })?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Failed to fetch event {event_id}: {}",
                response.status()
            )));
        }

        let event: Event = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Malformed event", e)
        })?;
        Ok(Some(event.into()))
    }

    async fn patch_event_attendees(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        attendees: &[RemoteAttendee],
    ) -> AppResult<()> {
        let attendees: Vec<serde_json::Value> = attendees
            .iter()
            .map(|a| {
                serde_json::json!({
                    "email": a.email,
                    "responseStatus": a.response_status,
                })
            })
            .collect();

        let response = self
            .http
            .patch(format!("{}/{event_id}", Self::events_url(calendar_id)))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "attendees": attendees }))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Event patch failed", e)
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Failed to patch event {event_id}: {}",
                response.status()
            )));
        }
        Ok(())
    }
}
