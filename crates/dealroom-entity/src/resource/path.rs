//! Storage path parsing and editable-document classification.

use serde::{Deserialize, Serialize};

/// Editable document categories understood by the external editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Text documents.
    Word,
    /// Spreadsheets.
    Cell,
    /// Presentations.
    Slide,
    /// PDF files (view/annotate).
    Pdf,
}

/// Extensions accepted for editor sessions, grouped by category.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "docx", "doc", "odt", "rtf", "txt", // word
    "xlsx", "xls", "ods", "csv", // cell
    "pptx", "ppt", "odp", // slide
    "pdf",
];

impl DocumentKind {
    /// Classify a lowercase file extension, or `None` if the extension is
    /// not editable.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "docx" | "doc" | "odt" | "rtf" | "txt" => Some(Self::Word),
            "xlsx" | "xls" | "ods" | "csv" => Some(Self::Cell),
            "pptx" | "ppt" | "odp" => Some(Self::Slide),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// The editor's `documentType` value for this category.
    pub fn as_editor_type(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Cell => "cell",
            Self::Slide => "slide",
            Self::Pdf => "pdf",
        }
    }
}

/// Filename and extension derived from a version storage path.
///
/// Version files are stored as `{…}/v{N}_{userId}_{Name.ext}`; the
/// version/user prefix is an implementation detail of the storage layout
/// and is stripped before the name is shown to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePathInfo {
    /// Human-facing filename (prefix stripped).
    pub file_name: String,
    /// Lowercased extension, empty when the filename has none.
    pub extension: String,
}

impl StoragePathInfo {
    /// Parse a storage path into its display filename and extension.
    pub fn parse(path: &str) -> Self {
        let last = path.rsplit('/').next().unwrap_or(path);
        let file_name = strip_version_prefix(last).to_string();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            file_name,
            extension,
        }
    }
}

/// Strip a leading `v{N}_{userId}_` prefix from a filename, if present.
fn strip_version_prefix(name: &str) -> &str {
    let Some(rest) = name.strip_prefix('v') else {
        return name;
    };
    let Some((digits, tail)) = rest.split_once('_') else {
        return name;
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return name;
    }
    // The second token is the creator's user id; the filename itself may
    // contain underscores, so only one more token is stripped.
    match tail.split_once('_') {
        Some((_, file)) if !file.is_empty() => file,
        _ => tail,
    }
}
