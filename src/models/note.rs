//! Note and file attachment models.

use serde::{Deserialize, Serialize};

/// A file attached to exactly one note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileAttachment {
    pub id: String,
    pub filename: String,
    /// Object name used to download the file via `/files/{path}`
    pub path: String,
}

/// A note as returned by the backend.
///
/// The client only ever holds transient copies for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub updated_at: String,
    #[serde(default)]
    pub files: Vec<FileAttachment>,
}

/// Request body for creating or updating a note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotePayload {
    pub title: String,
    pub content: String,
}

impl NotePayload {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}
