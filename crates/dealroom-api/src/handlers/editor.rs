//! Editor session bootstrap and save-callback handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};

use dealroom_core::error::AppError;
use dealroom_service::editor::{OpenSessionRequest, SaveCallbackPayload};

use crate::dto::request::CallbackQuery;
use crate::error::status_for_kind;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/editor/session
pub async fn open_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = state.editor_sessions.open(auth.context(), &request).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": session })))
}

/// POST /api/editor/callback?resource=<id>
///
/// Speaks the editor's own response contract instead of the standard
/// envelope: `{"error": 0}` on success and every acknowledged no-op,
/// `{"error": 1, "message": …}` on failure. The HTTP status still
/// distinguishes retryable server errors from terminal client errors.
pub async fn save_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    Json(payload): Json<SaveCallbackPayload>,
) -> Response {
    match state.save_callbacks.handle(query.resource, &payload).await {
        Ok(_) => Json(serde_json::json!({ "error": 0 })).into_response(),
        Err(e) => {
            let status = status_for_kind(e.kind);
            (
                status,
                Json(serde_json::json!({ "error": 1, "message": e.message })),
            )
                .into_response()
        }
    }
}
