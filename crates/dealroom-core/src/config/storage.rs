//! Document storage configuration.

use serde::{Deserialize, Serialize};

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Active provider: `"local"` or `"s3"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory for the local provider.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// HMAC secret for signing local download URLs.
    #[serde(default)]
    pub signed_url_secret: String,
    /// Lifetime of minted signed content URLs in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_seconds: u64,
    /// S3 provider settings (ignored for the local provider).
    #[serde(default)]
    pub s3: S3Config,
}

/// S3-compatible object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3Config {
    /// AWS region.
    #[serde(default)]
    pub region: String,
    /// Optional custom endpoint (MinIO, localstack).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Use path-style addressing (required for most custom endpoints).
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_data_root() -> String {
    "data/storage".to_string()
}

fn default_signed_url_ttl() -> u64 {
    3600
}
