//! # dealroom-storage
//!
//! Storage backends for document bytes. The [`StorageProvider`] trait is
//! defined in `dealroom-core`; this crate provides the local-filesystem
//! and S3 implementations, the signed download URL scheme used by the
//! local provider, and the [`manager::StorageManager`] that selects a
//! provider from configuration.
//!
//! [`StorageProvider`]: dealroom_core::traits::StorageProvider

pub mod manager;
pub mod providers;
pub mod signed_url;

pub use manager::StorageManager;
pub use signed_url::DownloadUrlSigner;
