//! Editor session bootstrap and save-callback handling.

pub mod callback;
pub mod session;
pub mod status;

pub use callback::{CallbackOutcome, SaveCallbackPayload, SaveCallbackService};
pub use session::{EditorSession, EditorSessionService, OpenSessionRequest};
pub use status::{SaveAction, SaveStatus};
