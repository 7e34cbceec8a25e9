//! Editor session bootstrap — version resolution and capability issuance.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use dealroom_auth::capability::{
    CapabilityDocument, CapabilityIssuer, DocumentPermissions, EditingCapability,
    EditorConfigClaims, EditorCustomization, EditorUser,
};
use dealroom_core::config::editor::EditorConfig;
use dealroom_core::error::AppError;
use dealroom_core::result::AppResult;
use dealroom_database::ResourceStore;
use dealroom_entity::resource::{ALLOWED_EXTENSIONS, DocumentKind, StoragePathInfo};
use dealroom_storage::StorageManager;

use crate::context::RequestContext;

/// Request to open a document in the external editor.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OpenSessionRequest {
    /// Storage bucket (organization id).
    pub bucket_id: String,
    /// Storage path of the version to open.
    pub file_path: String,
    /// `edit` or `view`.
    pub mode: String,
}

/// Everything a client needs to boot the external editor.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EditorSession {
    /// Signed capability token, consumed by the editor.
    pub token: String,
    /// Editor document category (`word`/`cell`/`slide`/`pdf`).
    pub document_type: String,
    /// Display filename.
    pub file_name: String,
    /// Editor cache key used for this session.
    pub key: String,
    /// When the signed content URL (and the token) expires.
    pub expires_at: chrono::DateTime<Utc>,
}

/// Resolves document versions and mints editing capabilities.
///
/// This is a pure read + token mint: nothing is persisted.
#[derive(Debug, Clone)]
pub struct EditorSessionService {
    /// Resource/version store.
    resources: Arc<dyn ResourceStore>,
    /// Storage manager for signed content URLs.
    storage: Arc<StorageManager>,
    /// Capability signer.
    issuer: Arc<CapabilityIssuer>,
    /// Editor behavior configuration.
    config: EditorConfig,
    /// Public base URL for the callback address.
    public_base_url: String,
}

impl EditorSessionService {
    /// Creates a new editor session service.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        storage: Arc<StorageManager>,
        issuer: Arc<CapabilityIssuer>,
        config: EditorConfig,
        public_base_url: String,
    ) -> Self {
        Self {
            resources,
            storage,
            issuer,
            config,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Open an editing session for the version at `file_path`.
    pub async fn open(
        &self,
        ctx: &RequestContext,
        request: &OpenSessionRequest,
    ) -> AppResult<EditorSession> {
        if request.mode != "edit" && request.mode != "view" {
            return Err(AppError::validation(format!(
                "Invalid mode '{}': expected 'edit' or 'view'",
                request.mode
            )));
        }

        let (resource, version) = self
            .resources
            .find_version_by_path(&request.bucket_id, &request.file_path)
            .await?
            .ok_or_else(|| AppError::not_found("Document version not found"))?;

        let info = StoragePathInfo::parse(&version.storage_path);
        // The file-type gate runs before any signed-URL mint.
        let kind = DocumentKind::from_extension(&info.extension).ok_or_else(|| {
            AppError::validation(format!(
                "Unsupported file type '{}': editable types are {}",
                info.extension,
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

        let url = self
            .storage
            .signed_url(&resource.bucket(), &version.storage_path)
            .await?;

        // The key folds in a fresh nonce so reopening after an edit can
        // never hit a stale cached rendering in the editor.
        let nonce = Uuid::new_v4().simple().to_string();
        let key = format!(
            "{}-{}-{}",
            resource.id,
            version.version_number,
            &nonce[..8]
        );

        let expires_at =
            Utc::now() + chrono::Duration::from_std(self.storage.signed_url_ttl()).unwrap_or_default();

        let capability = EditingCapability {
            document: CapabilityDocument {
                file_type: info.extension.clone(),
                key: key.clone(),
                title: info.file_name.clone(),
                url,
                permissions: DocumentPermissions {
                    edit: request.mode == "edit",
                    download: true,
                    print: true,
                },
            },
            document_type: kind.as_editor_type().to_string(),
            editor_config: EditorConfigClaims {
                mode: request.mode.clone(),
                lang: self.config.lang.clone(),
                callback_url: format!(
                    "{}/api/editor/callback?resource={}",
                    self.public_base_url, resource.id
                ),
                user: EditorUser {
                    id: ctx.user_id.to_string(),
                    name: ctx.name.clone(),
                },
                customization: EditorCustomization {
                    autosave: self.config.autosave,
                    forcesave: self.config.forcesave,
                    goback: None,
                },
            },
            width: "100%".to_string(),
            height: "100%".to_string(),
            surface: "desktop".to_string(),
            exp: expires_at.timestamp(),
        };

        let token = self.issuer.sign(&capability)?;

        info!(
            user_id = %ctx.user_id,
            resource_id = %resource.id,
            version = version.version_number,
            mode = %request.mode,
            "Editor session opened"
        );

        Ok(EditorSession {
            token,
            document_type: kind.as_editor_type().to_string(),
            file_name: info.file_name,
            key,
            expires_at,
        })
    }
}
