//! Resource entity — a logical, named document within a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A logical document belonging to a project/organization.
///
/// The actual bytes live in [`super::DocumentVersion`] rows; the resource
/// carries the indirection to the current one. `current_version_id` is
/// null until the first save lands.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: Uuid,
    /// Owning organization — also the storage bucket name.
    pub org_id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Display name, including extension (e.g. `RentRoll.xlsx`).
    pub name: String,
    /// Pointer to the active version, if any version exists.
    pub current_version_id: Option<Uuid>,
    /// When the resource was created.
    pub created_at: DateTime<Utc>,
    /// When the resource was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Storage bucket for this resource's bytes.
    pub fn bucket(&self) -> String {
        self.org_id.to_string()
    }

    /// Display name with path separators stripped, safe for embedding
    /// into a storage path.
    pub fn safe_name(&self) -> String {
        self.name.replace(['/', '\\'], "_")
    }
}
