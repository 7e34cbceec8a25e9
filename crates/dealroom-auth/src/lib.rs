//! # dealroom-auth
//!
//! Token handling for DealRoom: the signed editing capability consumed by
//! the external document editor, and verification of the platform-issued
//! access tokens API callers present.

pub mod access;
pub mod capability;

pub use access::{AccessClaims, AccessTokenVerifier};
pub use capability::{CapabilityIssuer, CapabilityVerifier, EditingCapability};
