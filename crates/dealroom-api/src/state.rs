//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use dealroom_auth::access::AccessTokenVerifier;
use dealroom_core::config::AppConfig;
use dealroom_service::calendar::{CalendarWatchService, ReconciliationService};
use dealroom_service::editor::{EditorSessionService, SaveCallbackService};
use dealroom_service::meeting::MeetingService;
use dealroom_storage::{DownloadUrlSigner, StorageManager};

/// Application state containing all shared dependencies.
///
/// Constructed once at process start and passed to every axum handler
/// via `State<AppState>`. All fields are `Arc`-wrapped for cheap cloning
/// across tasks — there is no global singleton anywhere.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,

    /// Storage manager (signed downloads, health).
    pub storage: Arc<StorageManager>,
    /// Verifier for signed local download URLs.
    pub url_signer: Arc<DownloadUrlSigner>,
    /// Verifier for platform access tokens.
    pub access_tokens: Arc<AccessTokenVerifier>,

    /// Editor session bootstrap service.
    pub editor_sessions: Arc<EditorSessionService>,
    /// Save-callback (version commit) service.
    pub save_callbacks: Arc<SaveCallbackService>,
    /// Calendar watch service.
    pub calendar_watch: Arc<CalendarWatchService>,
    /// Webhook reconciliation service.
    pub reconciliation: Arc<ReconciliationService>,
    /// Meeting response/reschedule service.
    pub meetings: Arc<MeetingService>,
}
