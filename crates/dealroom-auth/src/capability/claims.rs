//! Editing capability claims structure.
//!
//! Field names follow the editor's wire format (camelCase), so the
//! signed payload can be handed to it verbatim.

use serde::{Deserialize, Serialize};

/// Permission flags granted on the target document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPermissions {
    /// May modify the document.
    pub edit: bool,
    /// May download a copy.
    pub download: bool,
    /// May print.
    pub print: bool,
}

/// Target document identity within the capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDocument {
    /// File extension (e.g. `xlsx`).
    pub file_type: String,
    /// Editor cache key — unique per issuance so a reopened document
    /// after an edit never serves a stale cached rendering.
    pub key: String,
    /// Display title shown in the editor.
    pub title: String,
    /// Signed, time-bounded content URL.
    pub url: String,
    /// Permission flags.
    pub permissions: DocumentPermissions,
}

/// The acting user identity embedded in the capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorUser {
    /// User id (uuid as string).
    pub id: String,
    /// Display name.
    pub name: String,
}

/// "Go back" navigation target shown by the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoBack {
    /// URL to return to.
    pub url: String,
}

/// Editor behavior customization flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorCustomization {
    /// Autosave while editing.
    pub autosave: bool,
    /// Offer explicit force-save.
    pub forcesave: bool,
    /// Optional "go back" target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goback: Option<GoBack>,
}

/// Editor behavior configuration within the capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfigClaims {
    /// `edit` or `view`.
    pub mode: String,
    /// Editor UI language.
    pub lang: String,
    /// Where the editor posts save callbacks. Embeds the resource id —
    /// this is the addressing boundary fixed at issuance time.
    pub callback_url: String,
    /// Acting user.
    pub user: EditorUser,
    /// Behavior flags.
    pub customization: EditorCustomization,
}

/// The full signed capability payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditingCapability {
    /// Target document.
    pub document: CapabilityDocument,
    /// Document category: `word`, `cell`, `slide`, or `pdf`.
    pub document_type: String,
    /// Editor behavior configuration.
    pub editor_config: EditorConfigClaims,
    /// Editor frame width.
    pub width: String,
    /// Editor frame height.
    pub height: String,
    /// Surface type (`desktop`/`mobile`).
    #[serde(rename = "type")]
    pub surface: String,
    /// Expiration timestamp (seconds since epoch), aligned with the
    /// signed content URL's expiry.
    pub exp: i64,
}

impl EditingCapability {
    /// The acting user's id, if the capability names one.
    pub fn acting_user_id(&self) -> Option<uuid::Uuid> {
        let id = self.editor_config.user.id.trim();
        if id.is_empty() {
            return None;
        }
        id.parse().ok()
    }
}
