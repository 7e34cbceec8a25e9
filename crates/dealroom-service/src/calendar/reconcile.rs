//! Webhook-driven attendee-response reconciliation.
//!
//! Pulls the provider's current view of watched events and merges
//! attendee response states into local participant rows. Meeting timing
//! is locally authoritative and never written from this path.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use dealroom_core::result::AppResult;
use dealroom_core::traits::CalendarProvider;
use dealroom_database::{CalendarConnectionStore, MeetingStore};
use dealroom_entity::calendar::CalendarConnection;
use dealroom_entity::meeting::ResponseStatus;

use super::ensure_valid_token;

/// Outcome of an inbound change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// No connection matched the channel/resource tuple; acknowledged.
    Unmatched,
    /// Connection found but syncing is disabled; acknowledged.
    SyncDisabled,
    /// Reconciliation ran; `updated` participant rows changed.
    Reconciled {
        /// Number of participant rows whose status changed.
        updated: u64,
    },
    /// Reconciliation failed; logged and acknowledged.
    ReconcileFailed,
}

/// Fans inbound calendar notifications into participant-response updates.
#[derive(Debug, Clone)]
pub struct ReconciliationService {
    /// Connection store.
    connections: Arc<dyn CalendarConnectionStore>,
    /// Meeting store.
    meetings: Arc<dyn MeetingStore>,
    /// Calendar provider.
    provider: Arc<dyn CalendarProvider>,
}

impl ReconciliationService {
    /// Creates a new reconciliation service.
    pub fn new(
        connections: Arc<dyn CalendarConnectionStore>,
        meetings: Arc<dyn MeetingStore>,
        provider: Arc<dyn CalendarProvider>,
    ) -> Self {
        Self {
            connections,
            meetings,
            provider,
        }
    }

    /// Handle a content-change notification.
    ///
    /// Never returns an error for an unmatched channel or a failed
    /// reconciliation — the provider disables webhook endpoints that
    /// answer with failures.
    pub async fn handle_change(
        &self,
        channel_id: &str,
        resource_id: &str,
    ) -> AppResult<WebhookOutcome> {
        let Some(connection) = self
            .connections
            .find_by_channel(channel_id, resource_id)
            .await?
        else {
            info!(channel_id, "Webhook for unknown channel; acknowledging");
            return Ok(WebhookOutcome::Unmatched);
        };

        if !connection.sync_enabled {
            debug!(connection_id = %connection.id, "Sync disabled; acknowledging");
            return Ok(WebhookOutcome::SyncDisabled);
        }

        match self.reconcile(&connection).await {
            Ok(updated) => {
                info!(
                    connection_id = %connection.id,
                    updated,
                    "Attendee responses reconciled"
                );
                Ok(WebhookOutcome::Reconciled { updated })
            }
            Err(e) => {
                error!(
                    connection_id = %connection.id,
                    error = %e,
                    "Reconciliation failed; acknowledging webhook anyway"
                );
                Ok(WebhookOutcome::ReconcileFailed)
            }
        }
    }

    /// Pull provider state and merge attendee responses into local rows.
    async fn reconcile(&self, connection: &CalendarConnection) -> AppResult<u64> {
        let token = ensure_valid_token(connection, &self.provider, &self.connections).await?;
        let events = self
            .provider
            .list_events(&token, &connection.target_calendar_id())
            .await?;

        if events.is_empty() {
            return Ok(0);
        }

        let event_ids: Vec<String> = events.iter().map(|e| e.id.clone()).collect();
        let meetings = self.meetings.find_meetings_by_event_ids(&event_ids).await?;

        let mut updated = 0u64;
        for meeting in &meetings {
            let participants = self.meetings.list_participants(meeting.id).await?;
            let linked_ids = meeting.event_ids();

            for event in events.iter().filter(|e| linked_ids.contains(&e.id)) {
                for attendee in &event.attendees {
                    let Some(status) = ResponseStatus::from_provider(&attendee.response_status)
                    else {
                        continue;
                    };
                    // The only road back to pending is an organizer
                    // reschedule; a provider-side needsAction never
                    // downgrades a settled response.
                    if status == ResponseStatus::Pending {
                        continue;
                    }
                    let Some(participant) = participants
                        .iter()
                        .find(|p| p.email.eq_ignore_ascii_case(&attendee.email))
                    else {
                        continue;
                    };
                    // Already-current statuses are a no-op write.
                    if self
                        .meetings
                        .reconcile_participant_response(
                            meeting.id,
                            participant.user_id,
                            status,
                            Utc::now(),
                        )
                        .await?
                    {
                        updated += 1;
                    }
                }
            }
        }

        Ok(updated)
    }
}
