//! Capability token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use dealroom_core::error::AppError;

use super::claims::EditingCapability;

/// Validates round-tripped capability tokens on save-callback ingestion.
#[derive(Clone)]
pub struct CapabilityVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for CapabilityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl CapabilityVerifier {
    /// Creates a new verifier from the shared signing secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate a capability token.
    pub fn verify(&self, token: &str) -> Result<EditingCapability, AppError> {
        let token_data = decode::<EditingCapability>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Capability token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::authentication("Invalid capability token format")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid capability token signature")
                }
                _ => AppError::authentication(format!("Capability validation failed: {e}")),
            })?;

        Ok(token_data.claims)
    }
}
