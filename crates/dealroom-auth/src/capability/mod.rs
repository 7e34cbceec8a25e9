//! Editing capability tokens.
//!
//! An [`EditingCapability`] is an ephemeral, signed, non-persisted claim
//! authorizing the external editing surface to load/edit/save one
//! document version as one user. It is minted at session bootstrap,
//! consumed by the editor, and round-tripped back on the save callback
//! where its signature is verified before any side effect.

pub mod claims;
pub mod issuer;
pub mod verifier;

pub use claims::{
    CapabilityDocument, DocumentPermissions, EditingCapability, EditorConfigClaims,
    EditorCustomization, EditorUser, GoBack,
};
pub use issuer::CapabilityIssuer;
pub use verifier::CapabilityVerifier;
