//! Signed download handler for the local storage provider.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use dealroom_core::error::AppError;

use crate::dto::request::SignedDownloadQuery;
use crate::state::AppState;

/// GET /api/files/signed/{*path}?token=…
///
/// The token alone authorizes the read; the URL path is checked against
/// the token's claims so a minted link cannot be replayed for another
/// object.
pub async fn signed_download(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<SignedDownloadQuery>,
) -> Result<Response, AppError> {
    let claims = state.url_signer.verify(&query.token)?;

    let requested = path.trim_start_matches('/');
    let granted = format!("{}/{}", claims.bucket, claims.path);
    if requested != granted {
        return Err(AppError::authentication(
            "Download URL does not match the requested object",
        ));
    }

    let data = state.storage.read_bytes(&claims.bucket, &claims.path).await?;

    let filename = claims
        .path
        .rsplit('/')
        .next()
        .unwrap_or("download")
        .to_string();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
