//! Save-callback handling — the version-commit pipeline.
//!
//! The external editor posts lifecycle notifications here, out-of-band
//! from any user request. Only "ready to save" statuses reach the commit
//! pipeline; everything after the provisional version insert runs under a
//! per-resource lease, and any failure deletes the provisional row before
//! the error is surfaced.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use dealroom_auth::capability::CapabilityVerifier;
use dealroom_core::error::{AppError, ErrorKind};
use dealroom_core::result::AppResult;
use dealroom_database::ResourceStore;
use dealroom_entity::resource::{DocumentVersion, Resource, VersionMetadata};
use dealroom_storage::StorageManager;

use super::status::{SaveAction, SaveStatus};

/// How long a commit may hold the per-resource lease.
const COMMIT_LEASE: Duration = Duration::from_secs(60);

/// The editor's save-callback wire payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCallbackPayload {
    /// Raw editor status code.
    pub status: i32,
    /// Content-fetch URL for the edited bytes.
    #[serde(default)]
    pub url: Option<String>,
    /// Provider-specific changes blob URL.
    #[serde(default)]
    pub changesurl: Option<String>,
    /// The document key issued at session bootstrap.
    pub key: String,
    /// Users currently in the editing session.
    #[serde(default)]
    pub users: Option<Vec<String>>,
    /// Round-tripped capability token.
    pub token: String,
}

/// What a callback invocation did.
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    /// A new version was committed.
    Committed {
        /// The finalized version.
        version: DocumentVersion,
    },
    /// A prior callback already committed this save.
    Duplicate,
    /// Status required no action.
    NoOp,
    /// The editor reported an error; logged and acknowledged.
    ErrorAcknowledged,
}

/// Handles editor save callbacks.
#[derive(Debug, Clone)]
pub struct SaveCallbackService {
    /// Resource/version store.
    resources: Arc<dyn ResourceStore>,
    /// Storage manager for the durable upload.
    storage: Arc<StorageManager>,
    /// Capability verifier — the callback's auth gate.
    verifier: Arc<CapabilityVerifier>,
    /// Client for fetching edited bytes from the editor.
    http: reqwest::Client,
    /// Timeout for the byte fetch.
    fetch_timeout: Duration,
}

impl SaveCallbackService {
    /// Creates a new save-callback service.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        storage: Arc<StorageManager>,
        verifier: Arc<CapabilityVerifier>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            resources,
            storage,
            verifier,
            http: reqwest::Client::new(),
            fetch_timeout,
        }
    }

    /// Handle one callback invocation for the resource named in the
    /// callback URL's query string.
    pub async fn handle(
        &self,
        resource_id: Uuid,
        payload: &SaveCallbackPayload,
    ) -> AppResult<CallbackOutcome> {
        // Signature verification comes first; a failure here has zero
        // side effects.
        let capability = self.verifier.verify(&payload.token)?;

        let status = SaveStatus::from_code(payload.status);
        match status.action() {
            SaveAction::Persist => {
                self.commit(resource_id, payload, capability.acting_user_id())
                    .await
            }
            SaveAction::Ignore => {
                info!(%resource_id, "Editor closed document without changes");
                Ok(CallbackOutcome::NoOp)
            }
            SaveAction::ErrorAck => {
                warn!(%resource_id, ?status, "Editor reported a save error");
                Ok(CallbackOutcome::ErrorAcknowledged)
            }
            SaveAction::UnknownAck => {
                debug!(%resource_id, ?status, "Ignoring informational editor status");
                Ok(CallbackOutcome::NoOp)
            }
        }
    }

    /// The commit pipeline: provisional insert → supersede → fetch →
    /// upload → finalize → pointer advance, serialized per resource.
    async fn commit(
        &self,
        resource_id: Uuid,
        payload: &SaveCallbackPayload,
        acting_user: Option<Uuid>,
    ) -> AppResult<CallbackOutcome> {
        // Persistence requires a real acting user; a system/anonymous
        // event must never create a version.
        let user_id = acting_user
            .ok_or_else(|| AppError::validation("Save callback carried no acting user"))?;

        let content_url = payload
            .url
            .as_deref()
            .ok_or_else(|| AppError::validation("Save callback carried no content URL"))?;

        let resource = self
            .resources
            .find_resource(resource_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Resource {resource_id} not found")))?;

        // Idempotency: a retried callback for an already-committed save
        // acknowledges success without a second version.
        if let Some(existing) = self
            .resources
            .find_version_by_nonce(resource_id, &payload.key)
            .await?
        {
            info!(
                %resource_id,
                version = existing.version_number,
                key = %payload.key,
                "Duplicate save callback; version already committed"
            );
            return Ok(CallbackOutcome::Duplicate);
        }

        let holder = Uuid::new_v4();
        let locked = self
            .resources
            .acquire_resource_lock(resource_id, holder, COMMIT_LEASE)
            .await?;
        if !locked {
            return Err(AppError::service_unavailable(
                "Another save is in progress for this document",
            ));
        }

        let provisional = match self
            .resources
            .create_provisional_version(resource_id, user_id, payload.changesurl.as_deref(), &payload.key)
            .await
        {
            Ok(version) => version,
            Err(e) => {
                self.release_lock(resource_id, holder).await;
                // A concurrent duplicate lost the insert race on the nonce.
                if e.kind == ErrorKind::Conflict {
                    return Ok(CallbackOutcome::Duplicate);
                }
                return Err(e);
            }
        };

        let result = self
            .finish_commit(&resource, &provisional, content_url)
            .await;

        match result {
            Ok(version) => {
                self.release_lock(resource_id, holder).await;
                info!(
                    %resource_id,
                    version_id = %version.id,
                    version = version.version_number,
                    created_by = %user_id,
                    "Document version committed"
                );
                Ok(CallbackOutcome::Committed { version })
            }
            Err(e) => {
                // Compensate: the provisional row must not outlive a
                // failed commit. The pointer was never advanced, so
                // readers never saw it.
                if let Err(del) = self.resources.delete_version(provisional.id).await {
                    warn!(
                        %resource_id,
                        version_id = %provisional.id,
                        error = %del,
                        "Failed to delete provisional version after commit failure"
                    );
                }
                self.release_lock(resource_id, holder).await;
                Err(e)
            }
        }
    }

    /// Steps after the provisional insert. Runs under the lease.
    ///
    /// The byte fetch and upload run before any write to the other
    /// version rows, so a failed fetch compensates back to the exact
    /// pre-callback state.
    async fn finish_commit(
        &self,
        resource: &Resource,
        provisional: &DocumentVersion,
        content_url: &str,
    ) -> AppResult<DocumentVersion> {
        let storage_path = format!(
            "{}/resources/{}/v{}_{}",
            resource.project_id,
            resource.id,
            provisional.version_number,
            resource.safe_name()
        );

        let (bytes, mime_type) = self.fetch_edited_bytes(content_url).await?;
        let metadata = VersionMetadata {
            size_bytes: bytes.len() as u64,
            mime_type,
            downloaded_at: Utc::now(),
        };

        self.storage
            .write(&resource.bucket(), &storage_path, bytes)
            .await?;

        let version = self
            .resources
            .finalize_version(provisional.id, &storage_path, &metadata)
            .await?;

        self.resources
            .supersede_other_versions(resource.id, provisional.id)
            .await?;

        let advanced = self
            .resources
            .advance_current_version(resource.id, version.id, resource.current_version_id)
            .await?;
        if !advanced {
            // The optimistic compare detects (not prevents) an
            // interleaved advance; the newest commit still wins.
            warn!(
                resource_id = %resource.id,
                version_id = %version.id,
                "Concurrent current-version advance detected"
            );
            self.resources
                .force_current_version(resource.id, version.id)
                .await?;
        }

        Ok(version)
    }

    /// Fetch the edited bytes, capturing the reported MIME type.
    async fn fetch_edited_bytes(
        &self,
        content_url: &str,
    ) -> AppResult<(bytes::Bytes, Option<String>)> {
        let response = self
            .http
            .get(content_url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Failed to fetch edited document from editor",
                    e,
                )
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Editor returned {} for edited document fetch",
                response.status()
            )));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response.bytes().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Failed to read edited document body",
                e,
            )
        })?;

        Ok((bytes, mime_type))
    }

    async fn release_lock(&self, resource_id: Uuid, holder: Uuid) {
        if let Err(e) = self
            .resources
            .release_resource_lock(resource_id, holder)
            .await
        {
            warn!(%resource_id, error = %e, "Failed to release resource lock");
        }
    }
}
