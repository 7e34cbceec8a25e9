//! Capability token signing.

use jsonwebtoken::{EncodingKey, Header, encode};

use dealroom_core::error::AppError;

use super::claims::EditingCapability;

/// Signs editing capability tokens with the editor's shared secret.
#[derive(Clone)]
pub struct CapabilityIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for CapabilityIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityIssuer").finish()
    }
}

impl CapabilityIssuer {
    /// Creates a new issuer from the shared signing secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a capability, producing the token handed to the editor.
    pub fn sign(&self, capability: &EditingCapability) -> Result<String, AppError> {
        encode(&Header::default(), capability, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign capability token: {e}")))
    }
}
