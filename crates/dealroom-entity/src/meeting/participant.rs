//! Meeting participant entity and response-state rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A participant's response to a meeting invitation.
///
/// Transitions: `pending → {accepted, declined, tentative}` via an
/// explicit response or webhook reconciliation, and any state back to
/// `pending` when the organizer reschedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "response_status", rename_all = "lowercase")]
pub enum ResponseStatus {
    /// No response yet.
    Pending,
    /// Attending.
    Accepted,
    /// Not attending.
    Declined,
    /// Maybe attending.
    Tentative,
}

impl ResponseStatus {
    /// Map a provider attendee response string onto the local state.
    pub fn from_provider(status: &str) -> Option<Self> {
        match status {
            "needsAction" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "tentative" => Some(Self::Tentative),
            _ => None,
        }
    }

    /// The provider's representation of this state.
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            Self::Pending => "needsAction",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Tentative => "tentative",
        }
    }

    /// Local string form, matching the database enum labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Tentative => "tentative",
        }
    }

    /// Parse the local string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "tentative" => Some(Self::Tentative),
            _ => None,
        }
    }
}

/// A user's participation row for a meeting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MeetingParticipant {
    /// The meeting.
    pub meeting_id: Uuid,
    /// The participating user.
    pub user_id: Uuid,
    /// Email used to match this participant against provider attendees.
    pub email: String,
    /// Current response state.
    pub response_status: ResponseStatus,
    /// When the participant last responded.
    pub responded_at: Option<DateTime<Utc>>,
}
