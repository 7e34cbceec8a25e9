//! Document version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a document version.
///
/// Exactly one version per resource is `active` once any version exists;
/// all others are `superseded`. A version is never mutated after
/// finalization — corrections create a new version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "version_status", rename_all = "lowercase")]
pub enum VersionStatus {
    /// The current version of its resource.
    Active,
    /// Replaced by a newer version.
    Superseded,
}

/// An immutable snapshot of a resource's bytes at a point in time.
///
/// Created in a provisional state (placeholder storage path) when a save
/// is detected, finalized once bytes are durably stored. The version
/// number is assigned by a database trigger, never by the application.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The resource this version belongs to.
    pub resource_id: Uuid,
    /// Sequential version number (trigger-assigned).
    pub version_number: i32,
    /// User who created this version.
    pub created_by: Uuid,
    /// Path to this version's content in storage. A provisional version
    /// carries a placeholder until the upload completes.
    pub storage_path: String,
    /// Lifecycle status.
    pub status: VersionStatus,
    /// Provider-specific diff/changes blob URL, if supplied.
    pub changes_url: Option<String>,
    /// Idempotency key: the editor document key that produced this
    /// version. Duplicate callbacks for the same save are deduplicated
    /// against it.
    pub save_nonce: Option<String>,
    /// Byte size, MIME type, download timestamp.
    pub metadata: serde_json::Value,
    /// When this version row was created.
    pub created_at: DateTime<Utc>,
}

/// Metadata captured while fetching edited bytes from the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Size of the fetched document in bytes.
    pub size_bytes: u64,
    /// MIME type reported by the editor, if any.
    pub mime_type: Option<String>,
    /// When the bytes were fetched.
    pub downloaded_at: DateTime<Utc>,
}

/// Placeholder storage path carried by a provisional version row.
pub const PROVISIONAL_STORAGE_PATH: &str = "pending";
