//! Route definitions for the DealRoom HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use dealroom_core::config::app::CorsConfig;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes as usize;
    let cors = build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(editor_routes())
        .merge(file_routes())
        .merge(calendar_routes())
        .merge(meeting_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Editor session bootstrap and save callback
fn editor_routes() -> Router<AppState> {
    Router::new()
        .route("/editor/session", post(handlers::editor::open_session))
        .route("/editor/callback", post(handlers::editor::save_callback))
}

/// Signed downloads (local provider content URLs)
fn file_routes() -> Router<AppState> {
    Router::new().route(
        "/files/signed/{*path}",
        get(handlers::files::signed_download),
    )
}

/// Calendar watch management and inbound webhooks
fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/calendar/watch", post(handlers::calendar::register_watch))
        .route(
            "/calendar/connections/{id}",
            delete(handlers::calendar::disconnect),
        )
        .route("/calendar/webhook", post(handlers::calendar::webhook))
}

/// Meeting responses and reschedules
fn meeting_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/meetings/{id}/response",
            put(handlers::meeting::update_response),
        )
        .route(
            "/meetings/{id}/reschedule",
            put(handlers::meeting::reschedule),
        )
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Translate CORS configuration into a tower-http layer.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    if config.allowed_headers.iter().any(|h| h == "*") {
        layer = layer.allow_headers(Any);
    }

    layer
}
