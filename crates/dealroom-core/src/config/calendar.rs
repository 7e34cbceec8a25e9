//! Calendar provider configuration.

use serde::{Deserialize, Serialize};

/// External calendar provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// OAuth client id for the calendar provider.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret for the calendar provider.
    #[serde(default)]
    pub client_secret: String,
    /// Watch channel lifetime in days (provider caps this at 7-30 days).
    #[serde(default = "default_watch_ttl_days")]
    pub watch_ttl_days: i64,
    /// Whether the background watch-renewal loop runs.
    #[serde(default = "default_true")]
    pub renewal_enabled: bool,
    /// Interval between renewal scans, in seconds.
    #[serde(default = "default_renewal_interval")]
    pub renewal_interval_seconds: u64,
    /// Watches expiring within this window are renewed.
    #[serde(default = "default_renewal_window")]
    pub renewal_window_hours: i64,
}

fn default_watch_ttl_days() -> i64 {
    7
}

fn default_true() -> bool {
    true
}

fn default_renewal_interval() -> u64 {
    3600
}

fn default_renewal_window() -> i64 {
    24
}
