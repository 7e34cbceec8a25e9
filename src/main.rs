//! DealRoom Server — deal-document versioning and calendar sync backend.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use dealroom_core::config::AppConfig;
use dealroom_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment, failing fast on missing
/// secrets before anything else starts.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("DEALROOM_ENV").unwrap_or_else(|_| "development".to_string());

    let config = AppConfig::load(&env)?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DealRoom v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = dealroom_database::connection::create_pool(&config.database).await?;

    dealroom_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Storage provider + URL signing ───────────────────
    tracing::info!("Initializing storage provider...");
    let url_signer = dealroom_storage::DownloadUrlSigner::new(
        &config.storage.signed_url_secret,
        &config.server.public_base_url,
    );
    let storage = Arc::new(
        dealroom_storage::StorageManager::new(&config.storage, url_signer.clone()).await?,
    );
    let url_signer = Arc::new(url_signer);

    // ── Step 3: Stores ───────────────────────────────────────────
    let resource_store: Arc<dyn dealroom_database::ResourceStore> = Arc::new(
        dealroom_database::repositories::PgResourceStore::new(db_pool.clone()),
    );
    let connection_store: Arc<dyn dealroom_database::CalendarConnectionStore> = Arc::new(
        dealroom_database::repositories::PgCalendarConnectionStore::new(db_pool.clone()),
    );
    let meeting_store: Arc<dyn dealroom_database::MeetingStore> = Arc::new(
        dealroom_database::repositories::PgMeetingStore::new(db_pool.clone()),
    );

    // ── Step 4: Token components ─────────────────────────────────
    let capability_issuer = Arc::new(dealroom_auth::capability::CapabilityIssuer::new(
        &config.editor.signing_secret,
    ));
    let capability_verifier = Arc::new(dealroom_auth::capability::CapabilityVerifier::new(
        &config.editor.signing_secret,
    ));
    let access_tokens = Arc::new(dealroom_auth::access::AccessTokenVerifier::new(
        &config.auth,
    ));

    // ── Step 5: Calendar provider ────────────────────────────────
    let calendar_provider: Arc<dyn dealroom_core::traits::CalendarProvider> =
        Arc::new(dealroom_calendar::GoogleCalendarProvider::new(&config.calendar)?);

    // ── Step 6: Services ─────────────────────────────────────────
    tracing::info!("Initializing services...");
    let editor_sessions = Arc::new(dealroom_service::editor::EditorSessionService::new(
        Arc::clone(&resource_store),
        Arc::clone(&storage),
        Arc::clone(&capability_issuer),
        config.editor.clone(),
        config.server.public_base_url.clone(),
    ));
    let save_callbacks = Arc::new(dealroom_service::editor::SaveCallbackService::new(
        Arc::clone(&resource_store),
        Arc::clone(&storage),
        Arc::clone(&capability_verifier),
        std::time::Duration::from_secs(config.editor.fetch_timeout_seconds),
    ));
    let calendar_watch = Arc::new(dealroom_service::calendar::CalendarWatchService::new(
        Arc::clone(&connection_store),
        Arc::clone(&calendar_provider),
        config.calendar.clone(),
        config.server.public_base_url.clone(),
    ));
    let reconciliation = Arc::new(dealroom_service::calendar::ReconciliationService::new(
        Arc::clone(&connection_store),
        Arc::clone(&meeting_store),
        Arc::clone(&calendar_provider),
    ));
    let meetings = Arc::new(dealroom_service::meeting::MeetingService::new(
        Arc::clone(&meeting_store),
        Arc::clone(&connection_store),
        Arc::clone(&calendar_provider),
    ));
    tracing::info!("Services initialized");

    // ── Step 7: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 8: Watch renewal loop ───────────────────────────────
    let renewal_handle = if config.calendar.renewal_enabled {
        let service = Arc::clone(&calendar_watch);
        let cancel = shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            service.run_renewal_loop(cancel).await;
        });
        tracing::info!("Watch renewal loop started");
        Some(handle)
    } else {
        tracing::info!("Watch renewal loop disabled");
        None
    };

    // ── Step 9: Build and start HTTP server ──────────────────────
    let app_state = dealroom_api::state::AppState {
        config: Arc::new(config.clone()),
        storage: Arc::clone(&storage),
        url_signer: Arc::clone(&url_signer),
        access_tokens: Arc::clone(&access_tokens),
        editor_sessions: Arc::clone(&editor_sessions),
        save_callbacks: Arc::clone(&save_callbacks),
        calendar_watch: Arc::clone(&calendar_watch),
        reconciliation: Arc::clone(&reconciliation),
        meetings: Arc::clone(&meetings),
    };

    let app = dealroom_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("DealRoom server listening on {}", addr);

    // ── Step 10: Graceful shutdown ───────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 11: Wait for background tasks ───────────────────────
    if let Some(handle) = renewal_handle {
        let grace = std::time::Duration::from_secs(config.server.shutdown_grace_seconds);
        let _ = tokio::time::timeout(grace, handle).await;
    }

    tracing::info!("DealRoom server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
