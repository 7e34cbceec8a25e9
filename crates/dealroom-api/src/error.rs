//! Maps domain `AppError` to HTTP responses.
//!
//! The `IntoResponse for AppError` impl lives in `dealroom-core` (where
//! `AppError` is defined) to satisfy Rust's orphan rules; the API-layer
//! types are re-exported here so callers keep using `crate::error::*`.

pub use dealroom_core::error::{ApiErrorResponse, status_for_kind};
