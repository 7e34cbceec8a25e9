//! Editor save-callback status codes.
//!
//! The editor reports session lifecycle events with small integer codes.
//! They are parsed into [`SaveStatus`] at the boundary and classified
//! into a [`SaveAction`]; nothing past this module branches on raw codes.

/// Editor-reported session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// 0 — no document status.
    None,
    /// 1 — document is being edited.
    Editing,
    /// 2 — document is ready for saving.
    ReadyToSave,
    /// 3 — an error occurred while saving.
    SaveError,
    /// 4 — document closed with no changes.
    ClosedNoChanges,
    /// 6 — document is being edited, but the current state is saved
    /// (force-save).
    SavingWhileEditing,
    /// 7 — an error occurred while force-saving.
    ForceSaveError,
    /// Any code the editor's protocol does not define today.
    Unknown(i32),
}

/// What the callback handler should do for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    /// Run the version-commit pipeline.
    Persist,
    /// Acknowledge without side effects (closed with no changes).
    Ignore,
    /// Log the editor-side error, then acknowledge.
    ErrorAck,
    /// Acknowledge an informational or unrecognized status.
    UnknownAck,
}

impl SaveStatus {
    /// Parse a raw editor status code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Editing,
            2 => Self::ReadyToSave,
            3 => Self::SaveError,
            4 => Self::ClosedNoChanges,
            6 => Self::SavingWhileEditing,
            7 => Self::ForceSaveError,
            other => Self::Unknown(other),
        }
    }

    /// Classify this status into the handler's action.
    pub fn action(&self) -> SaveAction {
        match self {
            Self::ReadyToSave | Self::SavingWhileEditing => SaveAction::Persist,
            Self::ClosedNoChanges => SaveAction::Ignore,
            Self::SaveError | Self::ForceSaveError => SaveAction::ErrorAck,
            Self::None | Self::Editing | Self::Unknown(_) => SaveAction::UnknownAck,
        }
    }
}
