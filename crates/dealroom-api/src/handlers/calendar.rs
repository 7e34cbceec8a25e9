//! Calendar watch management and webhook handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use uuid::Uuid;

use dealroom_core::error::AppError;

use crate::dto::request::RegisterWatchRequest;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/calendar/watch
pub async fn register_watch(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<RegisterWatchRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let channel = state
        .calendar_watch
        .register(auth.context(), request.connection_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": channel })))
}

/// DELETE /api/calendar/connections/{id}
pub async fn disconnect(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = state.calendar_watch.disconnect(auth.context(), id).await?;
    let teardown_failed = outcome.watch_teardown_failed;

    let mut body = serde_json::json!({ "success": true, "data": outcome });
    if teardown_failed {
        body["warning"] = serde_json::json!(
            "Watch teardown failed; the connection was removed anyway"
        );
    }
    Ok(Json(body))
}

/// POST /api/calendar/webhook
///
/// Inbound push notifications from the calendar provider. Responds 200
/// in every case except missing required headers — providers disable
/// webhook endpoints that answer with failures.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let channel_id = header_str(&headers, "x-goog-channel-id")?;
    let resource_id = header_str(&headers, "x-goog-resource-id")?;
    let resource_state = header_str(&headers, "x-goog-resource-state")?;

    // Initial handshake: acknowledged without any connection lookup.
    if resource_state == "sync" {
        return Ok(Json(serde_json::json!({ "message": "Sync acknowledged" })));
    }

    let outcome = state
        .reconciliation
        .handle_change(channel_id, resource_id)
        .await?;

    tracing::debug!(?outcome, "Calendar webhook processed");
    Ok(Json(serde_json::json!({ "received": true })))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::validation(format!("Missing required header: {name}")))
}
