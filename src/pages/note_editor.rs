//! The note editor page: create or edit a note and manage its attachments.

use std::sync::Arc;

use crate::api::{FileUpload, NotesApi};
use crate::errors::ClientError;
use crate::models::{Note, NotePayload};
use crate::navigation::{Location, Navigator, Page};
use crate::notify::{Notice, Notifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    RemoveFile { note_id: i64, file_id: String },
}

/// An attachment already on the note being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingFile {
    pub filename: String,
    pub remove: EditorAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorView {
    /// `None` while composing a new note
    pub note_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub files: Vec<ExistingFile>,
}

impl EditorView {
    pub fn blank(note_id: Option<i64>) -> Self {
        Self {
            note_id,
            ..Self::default()
        }
    }

    fn from_note(note: &Note) -> Self {
        Self {
            note_id: Some(note.id),
            title: note.title.clone(),
            content: note.content.clone(),
            files: note
                .files
                .iter()
                .map(|file| ExistingFile {
                    filename: file.filename.clone(),
                    remove: EditorAction::RemoveFile {
                        note_id: note.id,
                        file_id: file.id.clone(),
                    },
                })
                .collect(),
        }
    }
}

/// What the viewer submitted from the editor.
#[derive(Debug, Clone, Default)]
pub struct EditorForm {
    pub note_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub uploads: Vec<FileUpload>,
}

pub struct NoteEditorController {
    api: NotesApi,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl NoteEditorController {
    pub fn new(api: NotesApi, navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            navigator,
            notifier,
        }
    }

    /// Prefill the form from an existing note, or start blank.
    pub async fn load(&self, note_id: Option<i64>) -> Result<EditorView, ClientError> {
        let Some(id) = note_id else {
            return Ok(EditorView::blank(None));
        };
        let note = self.api.get_note(id).await?;
        Ok(EditorView::from_note(&note))
    }

    /// Save the note, then upload the chosen files one by one, then go back to the list.
    pub async fn submit(&self, form: EditorForm) -> Result<Note, ClientError> {
        match self.save(form).await {
            Ok(note) => {
                self.navigator.assign(Location::page(Page::Notes));
                Ok(note)
            }
            Err(e) => {
                if !e.is_unauthenticated() {
                    self.notifier.notify(Notice::error(e.message()));
                }
                Err(e)
            }
        }
    }

    async fn save(&self, form: EditorForm) -> Result<Note, ClientError> {
        if form.title.trim().is_empty() {
            return Err(ClientError::Validation("Title is required".to_string()));
        }
        let payload = NotePayload::new(form.title, form.content);

        let mut note = match form.note_id {
            Some(id) => self.api.update_note(id, &payload).await?,
            None => self.api.create_note(&payload).await?,
        };

        let attached = self.api.upload_files(note.id, form.uploads).await?;
        note.files.extend(attached);
        Ok(note)
    }

    /// Run an editor action, returning the refreshed editor when something changed.
    pub async fn dispatch(&self, action: EditorAction) -> Result<Option<EditorView>, ClientError> {
        match action {
            EditorAction::RemoveFile { note_id, file_id } => {
                if !self.notifier.confirm("Delete this file?") {
                    return Ok(None);
                }
                if let Err(e) = self.api.delete_file(note_id, &file_id).await {
                    if !e.is_unauthenticated() {
                        self.notifier.notify(Notice::error(e.message()));
                    }
                    return Err(e);
                }
                self.load(Some(note_id)).await.map(Some)
            }
        }
    }
}
