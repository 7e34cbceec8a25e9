//! Signed download URLs for the local storage provider.
//!
//! S3 mints native presigned URLs; the local provider instead signs a
//! short-lived token naming the object, which the API's signed-download
//! route verifies before streaming bytes.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use dealroom_core::error::AppError;

/// Claims embedded in a signed download URL token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadClaims {
    /// Storage bucket holding the object.
    pub bucket: String,
    /// Object path within the bucket.
    pub path: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Signs and verifies local download URL tokens.
#[derive(Clone)]
pub struct DownloadUrlSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    base_url: String,
}

impl std::fmt::Debug for DownloadUrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadUrlSigner")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DownloadUrlSigner {
    /// Create a signer from the shared secret and the service's public
    /// base URL.
    pub fn new(secret: &str, base_url: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Mint a signed URL granting read access to one object.
    pub fn sign(&self, bucket: &str, path: &str, expires_in: Duration) -> Result<String, AppError> {
        let claims = DownloadClaims {
            bucket: bucket.to_string(),
            path: path.to_string(),
            exp: (Utc::now() + chrono::Duration::from_std(expires_in).unwrap_or_default())
                .timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign download URL: {e}")))?;

        Ok(format!(
            "{}/api/files/signed/{}/{}?token={}",
            self.base_url, bucket, path, token
        ))
    }

    /// Verify a download token and return its claims.
    pub fn verify(&self, token: &str) -> Result<DownloadClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        decode::<DownloadClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Download URL has expired")
                }
                _ => AppError::authentication("Invalid download URL signature"),
            })
    }
}
