//! Calendar watch management and webhook reconciliation.

pub mod reconcile;
pub mod watch;

pub use reconcile::{ReconciliationService, WebhookOutcome};
pub use watch::{CalendarWatchService, DisconnectOutcome, RenewalReport};

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use dealroom_core::result::AppResult;
use dealroom_core::traits::CalendarProvider;
use dealroom_database::CalendarConnectionStore;
use dealroom_entity::calendar::CalendarConnection;

use dealroom_core::error::AppError;

/// Return a currently valid access token for the connection, refreshing
/// (and persisting) it when it expires within five minutes.
pub(crate) async fn ensure_valid_token(
    connection: &CalendarConnection,
    provider: &Arc<dyn CalendarProvider>,
    connections: &Arc<dyn CalendarConnectionStore>,
) -> AppResult<String> {
    if connection.access_token.is_empty() {
        return Err(AppError::validation("Connection has no access token"));
    }

    if let Some(expires_at) = connection.token_expires_at {
        if expires_at > Utc::now() + chrono::Duration::minutes(5) {
            return Ok(connection.access_token.clone());
        }
    }

    if connection.refresh_token.is_empty() {
        return Err(AppError::validation("Connection has no refresh token"));
    }

    debug!(connection_id = %connection.id, "Refreshing access token");
    let refreshed = provider
        .refresh_access_token(&connection.refresh_token)
        .await?;
    connections
        .update_access_token(connection.id, &refreshed.access_token, refreshed.expires_at)
        .await?;

    Ok(refreshed.access_token)
}
