//! Meeting participant responses and organizer reschedules.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use dealroom_core::error::AppError;
use dealroom_core::result::AppResult;
use dealroom_core::traits::CalendarProvider;
use dealroom_core::traits::calendar::RemoteAttendee;
use dealroom_database::{CalendarConnectionStore, MeetingStore};
use dealroom_entity::meeting::{Meeting, ResponseStatus};

use crate::calendar::ensure_valid_token;
use crate::context::RequestContext;

/// Result of a response update.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UpdateResponseOutcome {
    /// Provider events the new status was pushed onto.
    pub synced_events: u64,
    /// Whether the user has a calendar connection to push to.
    pub calendar_connected: bool,
}

/// Result of a reschedule.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RescheduleOutcome {
    /// The meeting with its new window.
    pub meeting: Meeting,
    /// Non-organizer participants reset to pending.
    pub participants_reset: u64,
}

/// Manages participant responses and meeting reschedules.
#[derive(Debug, Clone)]
pub struct MeetingService {
    /// Meeting store.
    meetings: Arc<dyn MeetingStore>,
    /// Connection store (for the best-effort provider push).
    connections: Arc<dyn CalendarConnectionStore>,
    /// Calendar provider.
    provider: Arc<dyn CalendarProvider>,
}

impl MeetingService {
    /// Creates a new meeting service.
    pub fn new(
        meetings: Arc<dyn MeetingStore>,
        connections: Arc<dyn CalendarConnectionStore>,
        provider: Arc<dyn CalendarProvider>,
    ) -> Self {
        Self {
            meetings,
            connections,
            provider,
        }
    }

    /// Update the caller's own response to a meeting, then push the new
    /// status onto linked provider events (best effort).
    pub async fn update_response(
        &self,
        ctx: &RequestContext,
        meeting_id: Uuid,
        status: ResponseStatus,
    ) -> AppResult<UpdateResponseOutcome> {
        // Ownership: a user only ever writes their own row.
        let participant = self
            .meetings
            .find_participant(meeting_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("You are not a participant of this meeting"))?;

        self.meetings
            .record_participant_response(meeting_id, ctx.user_id, status, Utc::now())
            .await?;

        info!(
            %meeting_id,
            user_id = %ctx.user_id,
            status = status.as_str(),
            "Participant response recorded"
        );

        let meeting = self
            .meetings
            .find_meeting(meeting_id)
            .await?
            .ok_or_else(|| AppError::not_found("Meeting not found"))?;

        let Some(connection) = self
            .connections
            .find_by_user(ctx.user_id, "google")
            .await?
        else {
            return Ok(UpdateResponseOutcome {
                synced_events: 0,
                calendar_connected: false,
            });
        };

        // Provider push is best effort: local state is already committed
        // and a sync failure must not surface to the caller.
        let synced_events = match self
            .push_response(&connection, &meeting, &participant.email, status)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    %meeting_id,
                    error = %e,
                    "Failed to push response status to calendar provider"
                );
                0
            }
        };

        Ok(UpdateResponseOutcome {
            synced_events,
            calendar_connected: true,
        })
    }

    /// Move the meeting window. Organizer-only; resets every
    /// non-organizer participant back to pending.
    pub async fn reschedule(
        &self,
        ctx: &RequestContext,
        meeting_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<RescheduleOutcome> {
        let meeting = self
            .meetings
            .find_meeting(meeting_id)
            .await?
            .ok_or_else(|| AppError::not_found("Meeting not found"))?;

        if meeting.organizer_id != ctx.user_id {
            return Err(AppError::authorization(
                "Only the organizer can reschedule a meeting",
            ));
        }
        if end_time <= start_time {
            return Err(AppError::validation("Meeting must end after it starts"));
        }

        let updated = self
            .meetings
            .update_meeting_window(meeting_id, start_time, end_time)
            .await?;
        let participants_reset = self
            .meetings
            .reset_non_organizer_responses(meeting_id, meeting.organizer_id)
            .await?;

        info!(
            %meeting_id,
            participants_reset,
            "Meeting rescheduled; responses reset to pending"
        );

        Ok(RescheduleOutcome {
            meeting: updated,
            participants_reset,
        })
    }

    /// Patch the caller's attendee entry on each linked provider event.
    async fn push_response(
        &self,
        connection: &dealroom_entity::calendar::CalendarConnection,
        meeting: &Meeting,
        email: &str,
        status: ResponseStatus,
    ) -> AppResult<u64> {
        let event_ids = meeting.event_ids();
        if event_ids.is_empty() {
            return Ok(0);
        }

        let token = ensure_valid_token(connection, &self.provider, &self.connections).await?;
        let calendar_id = connection.target_calendar_id();

        let mut synced = 0u64;
        for event_id in &event_ids {
            let Some(event) = self
                .provider
                .get_event(&token, &calendar_id, event_id)
                .await?
            else {
                continue;
            };
            if event.attendees.is_empty() {
                continue;
            }

            let mut found = false;
            let attendees: Vec<RemoteAttendee> = event
                .attendees
                .iter()
                .map(|a| {
                    if a.email.eq_ignore_ascii_case(email) {
                        found = true;
                        RemoteAttendee {
                            email: a.email.clone(),
                            response_status: status.as_provider_str().to_string(),
                        }
                    } else {
                        a.clone()
                    }
                })
                .collect();

            if !found {
                continue;
            }

            match self
                .provider
                .patch_event_attendees(&token, &calendar_id, event_id, &attendees)
                .await
            {
                Ok(()) => synced += 1,
                Err(e) => {
                    warn!(event_id, error = %e, "Failed to patch provider event");
                }
            }
        }

        Ok(synced)
    }
}
