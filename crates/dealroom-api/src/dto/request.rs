//! Request body and query parameter shapes.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Query string of the editor save callback. The resource id is embedded
/// into the callback URL at capability-issuance time — it is the
/// callback's addressing boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Target resource.
    pub resource: Uuid,
}

/// Query string of the signed download route.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedDownloadQuery {
    /// Signed download token.
    pub token: String,
}

/// Body of `POST /api/calendar/watch`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterWatchRequest {
    /// The caller's calendar connection to watch.
    pub connection_id: Uuid,
}

/// Body of `PUT /api/meetings/{id}/response`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateResponseRequest {
    /// New response status: `pending`, `accepted`, `declined`, or
    /// `tentative`.
    pub status: String,
}

/// Body of `PUT /api/meetings/{id}/reschedule`.
#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleRequest {
    /// New start of the meeting window.
    pub start_time: DateTime<Utc>,
    /// New end of the meeting window.
    pub end_time: DateTime<Utc>,
}
