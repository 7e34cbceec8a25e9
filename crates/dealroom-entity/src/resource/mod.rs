//! Resource (logical document) entities.

pub mod model;
pub mod path;
pub mod version;

pub use model::Resource;
pub use path::{ALLOWED_EXTENSIONS, DocumentKind, StoragePathInfo};
pub use version::{DocumentVersion, VersionMetadata, VersionStatus};
