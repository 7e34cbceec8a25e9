//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// API caller authentication configuration.
///
/// DealRoom does not mint user credentials itself — callers present
/// platform-issued bearer tokens which are verified against this secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for verifying API access tokens (HS256).
    #[serde(default)]
    pub access_token_secret: String,
    /// Clock-skew leeway in seconds applied during token validation.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

fn default_leeway() -> u64 {
    5
}
