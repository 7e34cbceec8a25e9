//! Request context carried from the auth extractor into services.

use uuid::Uuid;

/// The authenticated caller of an API request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Authenticated user id.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Email, when the platform token includes it.
    pub email: Option<String>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, name: String, email: Option<String>) -> Self {
        Self {
            user_id,
            name,
            email,
        }
    }
}
