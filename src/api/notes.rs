//! Note endpoints.

use reqwest::Method;

use super::{decode, ensure_success, NotesApi};
use crate::errors::ClientError;
use crate::models::{Note, NotePayload};

impl NotesApi {
    /// GET /notes - List the signed-in user's notes.
    pub async fn list_notes(&self) -> Result<Vec<Note>, ClientError> {
        let gate = self.gatekeeper();
        let response = gate
            .send_authorized(gate.request(Method::GET, "/notes"))
            .await?;
        let notes: Vec<Note> = decode(response).await?;
        tracing::debug!("Loaded {} notes", notes.len());
        Ok(notes)
    }

    /// GET /notes/:id - Get a single note.
    pub async fn get_note(&self, id: i64) -> Result<Note, ClientError> {
        let gate = self.gatekeeper();
        let response = gate
            .send_authorized(gate.request(Method::GET, &format!("/notes/{}", id)))
            .await?;
        decode(response).await
    }

    /// POST /notes - Create a note.
    pub async fn create_note(&self, payload: &NotePayload) -> Result<Note, ClientError> {
        let gate = self.gatekeeper();
        let response = gate
            .send_authorized(gate.request(Method::POST, "/notes").json(payload))
            .await?;
        let note: Note = decode(response).await?;
        tracing::info!("Created note {}", note.id);
        Ok(note)
    }

    /// PUT /notes/:id - Replace a note's title and content.
    pub async fn update_note(&self, id: i64, payload: &NotePayload) -> Result<Note, ClientError> {
        let gate = self.gatekeeper();
        let response = gate
            .send_authorized(
                gate.request(Method::PUT, &format!("/notes/{}", id))
                    .json(payload),
            )
            .await?;
        let note: Note = decode(response).await?;
        tracing::info!("Updated note {}", note.id);
        Ok(note)
    }

    /// DELETE /notes/:id - Delete a note and its attachments.
    pub async fn delete_note(&self, id: i64) -> Result<(), ClientError> {
        let gate = self.gatekeeper();
        let response = gate
            .send_authorized(gate.request(Method::DELETE, &format!("/notes/{}", id)))
            .await?;
        ensure_success(response).await?;
        tracing::info!("Deleted note {}", id);
        Ok(())
    }
}
