//! Meeting entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A scheduled meeting between deal participants.
///
/// `calendar_event_ids` holds the external calendar event references
/// created for this meeting — one per participant/provider pair. Older
/// rows may carry a single bare string instead of an array.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meeting {
    /// Unique meeting identifier.
    pub id: Uuid,
    /// Organizing user.
    pub organizer_id: Uuid,
    /// Meeting title.
    pub title: String,
    /// Scheduled start.
    pub start_time: DateTime<Utc>,
    /// Scheduled end.
    pub end_time: DateTime<Utc>,
    /// External calendar event ids (JSON array of strings).
    pub calendar_event_ids: serde_json::Value,
    /// When the meeting was created.
    pub created_at: DateTime<Utc>,
    /// When the meeting was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    /// External event ids, tolerating the legacy single-string shape.
    pub fn event_ids(&self) -> Vec<String> {
        match &self.calendar_event_ids {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            serde_json::Value::String(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}
