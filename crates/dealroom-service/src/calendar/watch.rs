//! Calendar watch registration, teardown, and renewal.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use dealroom_core::config::calendar::CalendarConfig;
use dealroom_core::error::AppError;
use dealroom_core::result::AppResult;
use dealroom_core::traits::CalendarProvider;
use dealroom_core::traits::calendar::WatchChannel;
use dealroom_database::CalendarConnectionStore;
use dealroom_entity::calendar::CalendarConnection;

use crate::context::RequestContext;

use super::ensure_valid_token;

/// Result of a disconnect request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DisconnectOutcome {
    /// Whether the connection row was removed.
    pub removed: bool,
    /// Watch teardown failed; the connection was deleted anyway.
    pub watch_teardown_failed: bool,
}

/// Result of one renewal scan.
#[derive(Debug, Clone, Default)]
pub struct RenewalReport {
    /// Watches successfully renewed.
    pub renewed: u64,
    /// Watches that failed to renew.
    pub failed: u64,
}

/// Manages push-notification channels on the calendar provider.
#[derive(Debug, Clone)]
pub struct CalendarWatchService {
    /// Connection store.
    connections: Arc<dyn CalendarConnectionStore>,
    /// Calendar provider.
    provider: Arc<dyn CalendarProvider>,
    /// Calendar configuration.
    config: CalendarConfig,
    /// Public base URL receiving webhooks.
    public_base_url: String,
}

impl CalendarWatchService {
    /// Creates a new watch service.
    pub fn new(
        connections: Arc<dyn CalendarConnectionStore>,
        provider: Arc<dyn CalendarProvider>,
        config: CalendarConfig,
        public_base_url: String,
    ) -> Self {
        Self {
            connections,
            provider,
            config,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn webhook_url(&self) -> String {
        format!("{}/api/calendar/webhook", self.public_base_url)
    }

    /// Register a watch channel for the caller's connection.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
    ) -> AppResult<WatchChannel> {
        let connection = self
            .connections
            .find_by_id(connection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Calendar connection not found"))?;

        if connection.user_id != ctx.user_id {
            return Err(AppError::authorization(
                "You can only manage your own calendar connection",
            ));
        }

        let token = ensure_valid_token(&connection, &self.provider, &self.connections).await?;

        // Replace any existing channel; a stop failure only costs an
        // orphaned channel on the provider side, which expires on its own.
        if connection.has_watch() {
            self.stop_existing_watch(&connection, &token).await;
        }

        let channel = self.register_channel(&connection, &token).await?;

        info!(
            connection_id = %connection.id,
            channel_id = %channel.channel_id,
            expiration = %channel.expiration,
            "Calendar watch registered"
        );
        Ok(channel)
    }

    /// Disconnect a calendar: attempt watch teardown, then delete.
    ///
    /// Teardown failure never blocks deletion, but is surfaced to the
    /// caller as a warning.
    pub async fn disconnect(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
    ) -> AppResult<DisconnectOutcome> {
        let connection = self
            .connections
            .find_by_id(connection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Calendar connection not found"))?;

        if connection.user_id != ctx.user_id {
            return Err(AppError::authorization(
                "You can only manage your own calendar connection",
            ));
        }

        let mut watch_teardown_failed = false;
        if connection.has_watch() {
            let teardown =
                match ensure_valid_token(&connection, &self.provider, &self.connections).await {
                    Ok(token) => {
                        self.provider
                            .stop_watch(
                                &token,
                                connection.watch_channel_id.as_deref().unwrap_or_default(),
                                connection.watch_resource_id.as_deref().unwrap_or_default(),
                            )
                            .await
                    }
                    Err(e) => Err(e),
                };
            if let Err(e) = teardown {
                warn!(
                    connection_id = %connection.id,
                    error = %e,
                    "Watch teardown failed during disconnect"
                );
                watch_teardown_failed = true;
            }
        }

        let removed = self.connections.delete(connection.id).await?;
        info!(connection_id = %connection.id, removed, "Calendar connection deleted");

        Ok(DisconnectOutcome {
            removed,
            watch_teardown_failed,
        })
    }

    /// Renew every watch expiring inside the configured window.
    pub async fn renew_expiring(&self) -> AppResult<RenewalReport> {
        let cutoff = Utc::now() + chrono::Duration::hours(self.config.renewal_window_hours);
        let expiring = self.connections.find_watches_expiring_before(cutoff).await?;

        if expiring.is_empty() {
            return Ok(RenewalReport::default());
        }
        info!(count = expiring.len(), "Renewing expiring calendar watches");

        let mut report = RenewalReport::default();
        for connection in expiring {
            match self.renew_one(&connection).await {
                Ok(()) => report.renewed += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(
                        connection_id = %connection.id,
                        error = %e,
                        "Failed to renew calendar watch"
                    );
                }
            }
        }

        info!(
            renewed = report.renewed,
            failed = report.failed,
            "Watch renewal scan complete"
        );
        Ok(report)
    }

    /// Run the renewal loop until shutdown is signalled.
    pub async fn run_renewal_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.renewal_interval_seconds));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.renew_expiring().await {
                        error!(error = %e, "Watch renewal scan failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("Watch renewal loop stopping");
                    break;
                }
            }
        }
    }

    async fn renew_one(&self, connection: &CalendarConnection) -> AppResult<()> {
        let token = ensure_valid_token(connection, &self.provider, &self.connections).await?;
        self.stop_existing_watch(connection, &token).await;
        self.register_channel(connection, &token).await?;
        Ok(())
    }

    async fn register_channel(
        &self,
        connection: &CalendarConnection,
        token: &str,
    ) -> AppResult<WatchChannel> {
        let channel_id = format!(
            "dealroom-{}-{}",
            connection.id,
            Uuid::new_v4().simple()
        );
        let expiration = Utc::now() + chrono::Duration::days(self.config.watch_ttl_days);

        let channel = self
            .provider
            .watch_events(
                token,
                &connection.target_calendar_id(),
                &channel_id,
                &self.webhook_url(),
                expiration,
            )
            .await?;

        self.connections
            .set_watch(
                connection.id,
                &channel.channel_id,
                &channel.resource_id,
                channel.expiration,
            )
            .await?;

        Ok(channel)
    }

    async fn stop_existing_watch(&self, connection: &CalendarConnection, token: &str) {
        let (Some(channel_id), Some(resource_id)) = (
            connection.watch_channel_id.as_deref(),
            connection.watch_resource_id.as_deref(),
        ) else {
            return;
        };
        if let Err(e) = self
            .provider
            .stop_watch(token, channel_id, resource_id)
            .await
        {
            warn!(
                connection_id = %connection.id,
                channel_id,
                error = %e,
                "Failed to stop existing watch; continuing"
            );
        }
    }
}
