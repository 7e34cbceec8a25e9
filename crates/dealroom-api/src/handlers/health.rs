//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let storage_ok = state.storage.health_check().await.unwrap_or(false);

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": if storage_ok { "available" } else { "unavailable" },
    }))
}
