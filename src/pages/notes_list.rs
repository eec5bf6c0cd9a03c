//! The notes list page.

use std::sync::Arc;

use super::{format_timestamp, preview};
use crate::api::NotesApi;
use crate::errors::ClientError;
use crate::models::Note;
use crate::navigation::{Location, Navigator};
use crate::notify::{Notice, Notifier};

/// Something the viewer can do to a note card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAction {
    Edit(i64),
    Delete(i64),
}

/// Download link for an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLink {
    pub filename: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: i64,
    pub title: String,
    pub preview: String,
    pub files: Vec<FileLink>,
    pub updated_label: String,
    pub actions: Vec<NoteAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesView {
    pub cards: Vec<NoteCard>,
}

impl NotesView {
    pub fn titles(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.title.as_str()).collect()
    }

    pub fn card(&self, id: i64) -> Option<&NoteCard> {
        self.cards.iter().find(|c| c.id == id)
    }
}

pub struct NotesListController {
    api: NotesApi,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl NotesListController {
    pub fn new(api: NotesApi, navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            navigator,
            notifier,
        }
    }

    /// Fetch the full list from the backend and render it.
    ///
    /// Failures other than a rejected credential leave the list empty.
    pub async fn load(&self) -> Result<NotesView, ClientError> {
        match self.api.list_notes().await {
            Ok(notes) => Ok(self.render(&notes)),
            Err(e) if e.is_unauthenticated() => Err(e),
            Err(e) => {
                tracing::error!("Failed to load notes: {}", e);
                Ok(NotesView::default())
            }
        }
    }

    pub fn render(&self, notes: &[Note]) -> NotesView {
        let cards = notes
            .iter()
            .map(|note| NoteCard {
                id: note.id,
                title: note.title.clone(),
                preview: preview(&note.content),
                files: note
                    .files
                    .iter()
                    .map(|file| FileLink {
                        filename: file.filename.clone(),
                        href: self.api.file_url(&file.path),
                    })
                    .collect(),
                updated_label: format!("Last updated: {}", format_timestamp(&note.updated_at)),
                actions: vec![NoteAction::Edit(note.id), NoteAction::Delete(note.id)],
            })
            .collect();
        NotesView { cards }
    }

    /// Run a card action.
    ///
    /// Returns the reloaded list when the action changed the backend.
    pub async fn dispatch(&self, action: NoteAction) -> Result<Option<NotesView>, ClientError> {
        match action {
            NoteAction::Edit(id) => {
                self.navigator.assign(Location::editor(Some(id)));
                Ok(None)
            }
            NoteAction::Delete(id) => {
                if !self.notifier.confirm("Delete this note?") {
                    return Ok(None);
                }
                if let Err(e) = self.api.delete_note(id).await {
                    if !e.is_unauthenticated() {
                        self.notifier.notify(Notice::error(e.message()));
                    }
                    return Err(e);
                }
                self.load().await.map(Some)
            }
        }
    }
}
