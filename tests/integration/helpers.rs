//! Shared test helpers: in-memory stores, a scripted calendar provider,
//! an embedded fake editor server, and the `TestApp` harness.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::routing::get;
use chrono::{DateTime, Utc};
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use dealroom_api::state::AppState;
use dealroom_auth::access::{AccessClaims, AccessTokenVerifier};
use dealroom_auth::capability::{
    CapabilityDocument, CapabilityIssuer, CapabilityVerifier, DocumentPermissions,
    EditingCapability, EditorConfigClaims, EditorCustomization, EditorUser,
};
use dealroom_core::config::AppConfig;
use dealroom_core::error::AppError;
use dealroom_core::result::AppResult;
use dealroom_core::traits::calendar::{
    CalendarProvider, RefreshedToken, RemoteAttendee, RemoteEvent, WatchChannel,
};
use dealroom_database::{CalendarConnectionStore, MeetingStore, ResourceStore};
use dealroom_entity::calendar::CalendarConnection;
use dealroom_entity::meeting::{Meeting, MeetingParticipant, ResponseStatus};
use dealroom_entity::resource::version::PROVISIONAL_STORAGE_PATH;
use dealroom_entity::resource::{DocumentVersion, Resource, VersionMetadata, VersionStatus};
use dealroom_service::calendar::{CalendarWatchService, ReconciliationService};
use dealroom_service::editor::{EditorSessionService, SaveCallbackService};
use dealroom_service::meeting::MeetingService;
use dealroom_storage::providers::LocalStorageProvider;
use dealroom_storage::{DownloadUrlSigner, StorageManager};

pub const ACCESS_SECRET: &str = "test-access-secret";
pub const EDITOR_SECRET: &str = "test-editor-secret";
pub const URL_SECRET: &str = "test-url-secret";

// ── In-memory resource store ─────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryResourceStore {
    pub resources: Mutex<HashMap<Uuid, Resource>>,
    pub versions: Mutex<HashMap<Uuid, DocumentVersion>>,
    locks: Mutex<HashMap<Uuid, (Uuid, DateTime<Utc>)>>,
}

impl InMemoryResourceStore {
    pub fn insert_resource(&self, resource: Resource) {
        self.resources
            .lock()
            .unwrap()
            .insert(resource.id, resource);
    }

    pub fn insert_version(&self, version: DocumentVersion) {
        self.versions.lock().unwrap().insert(version.id, version);
    }

    pub fn resource(&self, id: Uuid) -> Resource {
        self.resources.lock().unwrap().get(&id).unwrap().clone()
    }

    pub fn versions_of(&self, resource_id: Uuid) -> Vec<DocumentVersion> {
        let mut versions: Vec<DocumentVersion> = self
            .versions
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.resource_id == resource_id)
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.version_number);
        versions
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn find_resource(&self, id: Uuid) -> AppResult<Option<Resource>> {
        Ok(self.resources.lock().unwrap().get(&id).cloned())
    }

    async fn find_version_by_path(
        &self,
        bucket: &str,
        path: &str,
    ) -> AppResult<Option<(Resource, DocumentVersion)>> {
        let Ok(org_id) = bucket.parse::<Uuid>() else {
            return Ok(None);
        };
        let version = self
            .versions
            .lock()
            .unwrap()
            .values()
            .find(|v| v.storage_path == path)
            .cloned();
        let Some(version) = version else {
            return Ok(None);
        };
        let resource = self
            .resources
            .lock()
            .unwrap()
            .get(&version.resource_id)
            .filter(|r| r.org_id == org_id)
            .cloned();
        Ok(resource.map(|r| (r, version)))
    }

    async fn find_versions(&self, resource_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        let mut versions = self.versions_of(resource_id);
        versions.reverse();
        Ok(versions)
    }

    async fn find_version_by_nonce(
        &self,
        resource_id: Uuid,
        nonce: &str,
    ) -> AppResult<Option<DocumentVersion>> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .values()
            .find(|v| v.resource_id == resource_id && v.save_nonce.as_deref() == Some(nonce))
            .cloned())
    }

    async fn create_provisional_version(
        &self,
        resource_id: Uuid,
        created_by: Uuid,
        changes_url: Option<&str>,
        save_nonce: &str,
    ) -> AppResult<DocumentVersion> {
        let mut versions = self.versions.lock().unwrap();
        if versions
            .values()
            .any(|v| v.resource_id == resource_id && v.save_nonce.as_deref() == Some(save_nonce))
        {
            return Err(AppError::conflict("A version for this save already exists"));
        }
        let version_number = versions
            .values()
            .filter(|v| v.resource_id == resource_id)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1;
        let version = DocumentVersion {
            id: Uuid::new_v4(),
            resource_id,
            version_number,
            created_by,
            storage_path: PROVISIONAL_STORAGE_PATH.to_string(),
            status: VersionStatus::Active,
            changes_url: changes_url.map(String::from),
            save_nonce: Some(save_nonce.to_string()),
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
        };
        versions.insert(version.id, version.clone());
        Ok(version)
    }

    async fn supersede_other_versions(&self, resource_id: Uuid, keep: Uuid) -> AppResult<u64> {
        let mut count = 0;
        for version in self.versions.lock().unwrap().values_mut() {
            if version.resource_id == resource_id
                && version.id != keep
                && version.status == VersionStatus::Active
            {
                version.status = VersionStatus::Superseded;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn finalize_version(
        &self,
        version_id: Uuid,
        storage_path: &str,
        metadata: &VersionMetadata,
    ) -> AppResult<DocumentVersion> {
        let mut versions = self.versions.lock().unwrap();
        let version = versions
            .get_mut(&version_id)
            .ok_or_else(|| AppError::not_found("Version not found"))?;
        version.storage_path = storage_path.to_string();
        version.metadata = serde_json::to_value(metadata)?;
        Ok(version.clone())
    }

    async fn delete_version(&self, version_id: Uuid) -> AppResult<bool> {
        Ok(self.versions.lock().unwrap().remove(&version_id).is_some())
    }

    async fn advance_current_version(
        &self,
        resource_id: Uuid,
        version_id: Uuid,
        expected_prior: Option<Uuid>,
    ) -> AppResult<bool> {
        let mut resources = self.resources.lock().unwrap();
        let Some(resource) = resources.get_mut(&resource_id) else {
            return Ok(false);
        };
        if resource.current_version_id != expected_prior {
            return Ok(false);
        }
        resource.current_version_id = Some(version_id);
        resource.updated_at = Utc::now();
        Ok(true)
    }

    async fn force_current_version(&self, resource_id: Uuid, version_id: Uuid) -> AppResult<()> {
        if let Some(resource) = self.resources.lock().unwrap().get_mut(&resource_id) {
            resource.current_version_id = Some(version_id);
        }
        Ok(())
    }

    async fn acquire_resource_lock(
        &self,
        resource_id: Uuid,
        holder: Uuid,
        lease: Duration,
    ) -> AppResult<bool> {
        let mut locks = self.locks.lock().unwrap();
        let now = Utc::now();
        if let Some((_, expires_at)) = locks.get(&resource_id) {
            if *expires_at > now {
                return Ok(false);
            }
        }
        locks.insert(
            resource_id,
            (
                holder,
                now + chrono::Duration::from_std(lease).unwrap_or_default(),
            ),
        );
        Ok(true)
    }

    async fn release_resource_lock(&self, resource_id: Uuid, holder: Uuid) -> AppResult<()> {
        let mut locks = self.locks.lock().unwrap();
        if locks.get(&resource_id).map(|(h, _)| *h) == Some(holder) {
            locks.remove(&resource_id);
        }
        Ok(())
    }
}

// ── In-memory calendar connection store ──────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryConnectionStore {
    pub connections: Mutex<HashMap<Uuid, CalendarConnection>>,
}

impl InMemoryConnectionStore {
    pub fn insert(&self, connection: CalendarConnection) {
        self.connections
            .lock()
            .unwrap()
            .insert(connection.id, connection);
    }

    pub fn get(&self, id: Uuid) -> Option<CalendarConnection> {
        self.connections.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl CalendarConnectionStore for InMemoryConnectionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CalendarConnection>> {
        Ok(self.get(id))
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        provider: &str,
    ) -> AppResult<Option<CalendarConnection>> {
        Ok(self
            .connections
            .lock()
            .unwrap()
            .values()
            .find(|c| c.user_id == user_id && c.provider == provider)
            .cloned())
    }

    async fn find_by_channel(
        &self,
        channel_id: &str,
        resource_id: &str,
    ) -> AppResult<Option<CalendarConnection>> {
        Ok(self
            .connections
            .lock()
            .unwrap()
            .values()
            .find(|c| {
                c.watch_channel_id.as_deref() == Some(channel_id)
                    && c.watch_resource_id.as_deref() == Some(resource_id)
            })
            .cloned())
    }

    async fn set_watch(
        &self,
        id: Uuid,
        channel_id: &str,
        resource_id: &str,
        expiration: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(connection) = self.connections.lock().unwrap().get_mut(&id) {
            connection.watch_channel_id = Some(channel_id.to_string());
            connection.watch_resource_id = Some(resource_id.to_string());
            connection.watch_expiration = Some(expiration);
        }
        Ok(())
    }

    async fn clear_watch(&self, id: Uuid) -> AppResult<()> {
        if let Some(connection) = self.connections.lock().unwrap().get_mut(&id) {
            connection.watch_channel_id = None;
            connection.watch_resource_id = None;
            connection.watch_expiration = None;
        }
        Ok(())
    }

    async fn update_access_token(
        &self,
        id: Uuid,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(connection) = self.connections.lock().unwrap().get_mut(&id) {
            connection.access_token = access_token.to_string();
            connection.token_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.connections.lock().unwrap().remove(&id).is_some())
    }

    async fn find_watches_expiring_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarConnection>> {
        Ok(self
            .connections
            .lock()
            .unwrap()
            .values()
            .filter(|c| {
                c.watch_channel_id.is_some()
                    && c.watch_expiration.map(|e| e <= cutoff).unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

// ── In-memory meeting store ──────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryMeetingStore {
    pub meetings: Mutex<HashMap<Uuid, Meeting>>,
    pub participants: Mutex<HashMap<(Uuid, Uuid), MeetingParticipant>>,
}

impl InMemoryMeetingStore {
    pub fn insert_meeting(&self, meeting: Meeting) {
        self.meetings.lock().unwrap().insert(meeting.id, meeting);
    }

    pub fn insert_participant(&self, participant: MeetingParticipant) {
        self.participants
            .lock()
            .unwrap()
            .insert((participant.meeting_id, participant.user_id), participant);
    }

    pub fn participant(&self, meeting_id: Uuid, user_id: Uuid) -> MeetingParticipant {
        self.participants
            .lock()
            .unwrap()
            .get(&(meeting_id, user_id))
            .unwrap()
            .clone()
    }

    pub fn meeting(&self, id: Uuid) -> Meeting {
        self.meetings.lock().unwrap().get(&id).unwrap().clone()
    }
}

#[async_trait]
impl MeetingStore for InMemoryMeetingStore {
    async fn find_meeting(&self, id: Uuid) -> AppResult<Option<Meeting>> {
        Ok(self.meetings.lock().unwrap().get(&id).cloned())
    }

    async fn find_meetings_by_event_ids(&self, event_ids: &[String]) -> AppResult<Vec<Meeting>> {
        Ok(self
            .meetings
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.event_ids().iter().any(|id| event_ids.contains(id)))
            .cloned()
            .collect())
    }

    async fn list_participants(&self, meeting_id: Uuid) -> AppResult<Vec<MeetingParticipant>> {
        Ok(self
            .participants
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.meeting_id == meeting_id)
            .cloned()
            .collect())
    }

    async fn find_participant(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<MeetingParticipant>> {
        Ok(self
            .participants
            .lock()
            .unwrap()
            .get(&(meeting_id, user_id))
            .cloned())
    }

    async fn record_participant_response(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
        status: ResponseStatus,
        responded_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut participants = self.participants.lock().unwrap();
        let Some(participant) = participants.get_mut(&(meeting_id, user_id)) else {
            return Ok(false);
        };
        participant.response_status = status;
        participant.responded_at = Some(responded_at);
        Ok(true)
    }

    async fn reconcile_participant_response(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
        status: ResponseStatus,
        responded_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut participants = self.participants.lock().unwrap();
        let Some(participant) = participants.get_mut(&(meeting_id, user_id)) else {
            return Ok(false);
        };
        if participant.response_status == status {
            return Ok(false);
        }
        participant.response_status = status;
        participant.responded_at = Some(responded_at);
        Ok(true)
    }

    async fn reset_non_organizer_responses(
        &self,
        meeting_id: Uuid,
        organizer_id: Uuid,
    ) -> AppResult<u64> {
        let mut count = 0;
        for participant in self.participants.lock().unwrap().values_mut() {
            if participant.meeting_id == meeting_id && participant.user_id != organizer_id {
                participant.response_status = ResponseStatus::Pending;
                participant.responded_at = None;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn update_meeting_window(
        &self,
        meeting_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<Meeting> {
        let mut meetings = self.meetings.lock().unwrap();
        let meeting = meetings
            .get_mut(&meeting_id)
            .ok_or_else(|| AppError::not_found("Meeting not found"))?;
        meeting.start_time = start_time;
        meeting.end_time = end_time;
        meeting.updated_at = Utc::now();
        Ok(meeting.clone())
    }
}

// ── Scripted calendar provider ───────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeCalendarProvider {
    /// Events returned by `list_events`/`get_event`.
    pub events: Mutex<Vec<RemoteEvent>>,
    /// Recorded watch registrations: (channel_id, webhook_url).
    pub watch_calls: Mutex<Vec<(String, String)>>,
    /// Recorded stops: (channel_id, resource_id).
    pub stop_calls: Mutex<Vec<(String, String)>>,
    /// Recorded attendee patches: (event_id, attendees).
    pub patch_calls: Mutex<Vec<(String, Vec<RemoteAttendee>)>>,
    /// When set, `stop_watch` fails.
    pub fail_stop: AtomicBool,
}

impl FakeCalendarProvider {
    pub fn set_events(&self, events: Vec<RemoteEvent>) {
        *self.events.lock().unwrap() = events;
    }

    pub fn set_fail_stop(&self) {
        self.fail_stop.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CalendarProvider for FakeCalendarProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn refresh_access_token(&self, _refresh_token: &str) -> AppResult<RefreshedToken> {
        Ok(RefreshedToken {
            access_token: "refreshed-token".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        })
    }

    async fn watch_events(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        channel_id: &str,
        webhook_url: &str,
        expiration: DateTime<Utc>,
    ) -> AppResult<WatchChannel> {
        self.watch_calls
            .lock()
            .unwrap()
            .push((channel_id.to_string(), webhook_url.to_string()));
        Ok(WatchChannel {
            channel_id: channel_id.to_string(),
            resource_id: format!("fake-resource-{}", Uuid::new_v4().simple()),
            expiration,
        })
    }

    async fn stop_watch(
        &self,
        _access_token: &str,
        channel_id: &str,
        resource_id: &str,
    ) -> AppResult<()> {
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(AppError::external_service("Stop-watch failed"));
        }
        self.stop_calls
            .lock()
            .unwrap()
            .push((channel_id.to_string(), resource_id.to_string()));
        Ok(())
    }

    async fn list_events(
        &self,
        _access_token: &str,
        _calendar_id: &str,
    ) -> AppResult<Vec<RemoteEvent>> {
        Ok(self.events.lock().unwrap().clone())
    }

    async fn get_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        event_id: &str,
    ) -> AppResult<Option<RemoteEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == event_id)
            .cloned())
    }

    async fn patch_event_attendees(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        event_id: &str,
        attendees: &[RemoteAttendee],
    ) -> AppResult<()> {
        self.patch_calls
            .lock()
            .unwrap()
            .push((event_id.to_string(), attendees.to_vec()));
        Ok(())
    }
}

// ── Test application ─────────────────────────────────────────────

/// A parsed HTTP response.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Test application context.
pub struct TestApp {
    /// The axum router for making test requests.
    pub router: Router,
    /// Full application state (for driving services directly).
    pub state: AppState,
    pub resources: Arc<InMemoryResourceStore>,
    pub connections: Arc<InMemoryConnectionStore>,
    pub meetings: Arc<InMemoryMeetingStore>,
    pub provider: Arc<FakeCalendarProvider>,
    /// Address of the embedded fake editor server.
    pub editor_addr: SocketAddr,
    _storage_dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application over fresh fakes.
    pub async fn new() -> Self {
        let storage_dir = tempfile::tempdir().expect("Failed to create temp storage dir");
        let base_url = "http://localhost:8080";

        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": { "public_base_url": base_url },
            "database": { "url": "postgres://unused" },
            "auth": { "access_token_secret": ACCESS_SECRET },
            "storage": {
                "signed_url_secret": URL_SECRET,
                "data_root": storage_dir.path().to_str().unwrap(),
            },
            "editor": { "signing_secret": EDITOR_SECRET, "fetch_timeout_seconds": 5 },
            "calendar": { "renewal_enabled": false },
            "logging": {},
        }))
        .expect("Failed to build test config");

        let url_signer = DownloadUrlSigner::new(URL_SECRET, base_url);
        let local =
            LocalStorageProvider::new(storage_dir.path().to_str().unwrap(), url_signer.clone())
                .await
                .expect("Failed to init local storage");
        let storage = Arc::new(StorageManager::with_provider(
            Arc::new(local),
            Duration::from_secs(3600),
        ));

        let resources = Arc::new(InMemoryResourceStore::default());
        let connections = Arc::new(InMemoryConnectionStore::default());
        let meetings = Arc::new(InMemoryMeetingStore::default());
        let provider = Arc::new(FakeCalendarProvider::default());

        let resource_store: Arc<dyn ResourceStore> = Arc::clone(&resources) as _;
        let connection_store: Arc<dyn CalendarConnectionStore> = Arc::clone(&connections) as _;
        let meeting_store: Arc<dyn MeetingStore> = Arc::clone(&meetings) as _;
        let calendar_provider: Arc<dyn CalendarProvider> = Arc::clone(&provider) as _;

        let capability_issuer = Arc::new(CapabilityIssuer::new(EDITOR_SECRET));
        let capability_verifier = Arc::new(CapabilityVerifier::new(EDITOR_SECRET));
        let access_tokens = Arc::new(AccessTokenVerifier::new(&config.auth));

        let editor_sessions = Arc::new(EditorSessionService::new(
            Arc::clone(&resource_store),
            Arc::clone(&storage),
            Arc::clone(&capability_issuer),
            config.editor.clone(),
            base_url.to_string(),
        ));
        let save_callbacks = Arc::new(SaveCallbackService::new(
            Arc::clone(&resource_store),
            Arc::clone(&storage),
            Arc::clone(&capability_verifier),
            Duration::from_secs(5),
        ));
        let calendar_watch = Arc::new(CalendarWatchService::new(
            Arc::clone(&connection_store),
            Arc::clone(&calendar_provider),
            config.calendar.clone(),
            base_url.to_string(),
        ));
        let reconciliation = Arc::new(ReconciliationService::new(
            Arc::clone(&connection_store),
            Arc::clone(&meeting_store),
            Arc::clone(&calendar_provider),
        ));
        let meeting_service = Arc::new(MeetingService::new(
            Arc::clone(&meeting_store),
            Arc::clone(&connection_store),
            Arc::clone(&calendar_provider),
        ));

        let state = AppState {
            config: Arc::new(config),
            storage,
            url_signer: Arc::new(url_signer),
            access_tokens,
            editor_sessions,
            save_callbacks,
            calendar_watch,
            reconciliation,
            meetings: meeting_service,
        };

        let router = dealroom_api::build_router(state.clone());
        let editor_addr = spawn_fake_editor().await;

        Self {
            router,
            state,
            resources,
            connections,
            meetings,
            provider,
            editor_addr,
            _storage_dir: storage_dir,
        }
    }

    /// Mint a platform access token for a test user.
    pub fn access_token(&self, user_id: Uuid, name: &str, email: Option<&str>) -> String {
        let claims = AccessClaims {
            sub: user_id,
            name: name.to_string(),
            email: email.map(String::from),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 900,
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap()
    }

    /// Sign a capability token the way a real editor session would
    /// round-trip it.
    pub fn capability_token(&self, user_id: &str, key: &str, secret: &str) -> String {
        let capability = EditingCapability {
            document: CapabilityDocument {
                file_type: "xlsx".into(),
                key: key.to_string(),
                title: "RentRoll.xlsx".into(),
                url: "http://unused".into(),
                permissions: DocumentPermissions {
                    edit: true,
                    download: true,
                    print: true,
                },
            },
            document_type: "cell".into(),
            editor_config: EditorConfigClaims {
                mode: "edit".into(),
                lang: "en".into(),
                callback_url: "http://localhost:8080/api/editor/callback".into(),
                user: EditorUser {
                    id: user_id.to_string(),
                    name: "Test User".into(),
                },
                customization: EditorCustomization {
                    autosave: true,
                    forcesave: false,
                    goback: None,
                },
            },
            width: "100%".into(),
            height: "100%".into(),
            surface: "desktop".into(),
            exp: Utc::now().timestamp() + 3600,
        };
        CapabilityIssuer::new(secret).sign(&capability).unwrap()
    }

    /// Issue a request against the router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_with_headers(method, path, body, token, &[])
            .await
    }

    /// Issue a request with extra headers.
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    // ── Seed helpers ─────────────────────────────────────────────

    pub fn seed_resource(&self, org_id: Uuid, project_id: Uuid, name: &str) -> Resource {
        let resource = Resource {
            id: Uuid::new_v4(),
            org_id,
            project_id,
            name: name.to_string(),
            current_version_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.resources.insert_resource(resource.clone());
        resource
    }

    pub fn seed_version(
        &self,
        resource: &Resource,
        version_number: i32,
        storage_path: &str,
        status: VersionStatus,
    ) -> DocumentVersion {
        let version = DocumentVersion {
            id: Uuid::new_v4(),
            resource_id: resource.id,
            version_number,
            created_by: Uuid::new_v4(),
            storage_path: storage_path.to_string(),
            status,
            changes_url: None,
            save_nonce: None,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
        };
        self.resources.insert_version(version.clone());
        if status == VersionStatus::Active {
            let mut resources = self.resources.resources.lock().unwrap();
            resources.get_mut(&resource.id).unwrap().current_version_id = Some(version.id);
        }
        version
    }

    pub fn seed_connection(
        &self,
        user_id: Uuid,
        watch: Option<(&str, &str)>,
    ) -> CalendarConnection {
        let connection = CalendarConnection {
            id: Uuid::new_v4(),
            user_id,
            provider: "google".into(),
            provider_email: "user@example.com".into(),
            access_token: "valid-token".into(),
            refresh_token: "refresh-token".into(),
            token_expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
            calendar_list: serde_json::json!([{"id": "primary", "primary": true}]),
            sync_enabled: true,
            watch_channel_id: watch.map(|(c, _)| c.to_string()),
            watch_resource_id: watch.map(|(_, r)| r.to_string()),
            watch_expiration: watch.map(|_| Utc::now() + chrono::Duration::days(6)),
            created_at: Utc::now(),
        };
        self.connections.insert(connection.clone());
        connection
    }

    pub fn seed_meeting(&self, organizer_id: Uuid, event_ids: Value) -> Meeting {
        let meeting = Meeting {
            id: Uuid::new_v4(),
            organizer_id,
            title: "Underwriting review".into(),
            start_time: Utc::now() + chrono::Duration::days(1),
            end_time: Utc::now() + chrono::Duration::days(1) + chrono::Duration::hours(1),
            calendar_event_ids: event_ids,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.meetings.insert_meeting(meeting.clone());
        meeting
    }

    pub fn seed_participant(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
        email: &str,
        status: ResponseStatus,
    ) -> MeetingParticipant {
        let participant = MeetingParticipant {
            meeting_id,
            user_id,
            email: email.to_string(),
            response_status: status,
            responded_at: None,
        };
        self.meetings.insert_participant(participant.clone());
        participant
    }

    /// URL of a document served by the embedded fake editor.
    pub fn editor_content_url(&self, path: &str) -> String {
        format!("http://{}{}", self.editor_addr, path)
    }
}

/// Spawn a minimal HTTP server standing in for the external editor's
/// content endpoint.
async fn spawn_fake_editor() -> SocketAddr {
    let app = Router::new()
        .route("/doc1", get(|| async { "edited-bytes-1" }))
        .route("/doc2", get(|| async { "edited-bytes-2" }))
        .route(
            "/missing",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake editor");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}
