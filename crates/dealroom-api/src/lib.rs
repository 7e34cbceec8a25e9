//! # dealroom-api
//!
//! HTTP API layer for DealRoom: the axum router, application state,
//! handlers, extractors, middleware, and the mapping from [`AppError`]
//! to HTTP responses.
//!
//! [`AppError`]: dealroom_core::AppError

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
