//! Meeting response and reschedule handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use dealroom_core::error::AppError;
use dealroom_entity::meeting::ResponseStatus;

use crate::dto::request::{RescheduleRequest, UpdateResponseRequest};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// PUT /api/meetings/{id}/response
pub async fn update_response(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateResponseRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = ResponseStatus::parse(&request.status).ok_or_else(|| {
        AppError::validation(format!(
            "Invalid response status '{}': expected pending, accepted, declined, or tentative",
            request.status
        ))
    })?;

    let outcome = state
        .meetings
        .update_response(auth.context(), id, status)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": outcome })))
}

/// PUT /api/meetings/{id}/reschedule
pub async fn reschedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = state
        .meetings
        .reschedule(auth.context(), id, request.start_time, request.end_time)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": outcome })))
}
