//! Remote document editor configuration.

use serde::{Deserialize, Serialize};

/// Settings for the external document-editing surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// HMAC secret shared with the editor for capability token signing.
    #[serde(default)]
    pub signing_secret: String,
    /// Default editor UI language.
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Whether the editor should autosave while editing.
    #[serde(default = "default_true")]
    pub autosave: bool,
    /// Whether the editor should offer explicit force-save.
    #[serde(default)]
    pub forcesave: bool,
    /// Timeout for fetching edited bytes from the editor, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    30
}
