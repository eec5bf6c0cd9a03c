//! File attachment endpoints.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Method;

use super::{decode, ensure_success, NotesApi};
use crate::errors::ClientError;
use crate::models::FileAttachment;

/// A file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming the upload after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::Validation(format!("Not a file: {}", path.display())))?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { filename, bytes })
    }

    fn into_form(self) -> Form {
        Form::new().part("file", Part::bytes(self.bytes).file_name(self.filename))
    }
}

impl NotesApi {
    /// POST /notes/:id/files - Attach one file to a note.
    pub async fn upload_file(
        &self,
        note_id: i64,
        upload: FileUpload,
    ) -> Result<FileAttachment, ClientError> {
        let gate = self.gatekeeper();
        let filename = upload.filename.clone();
        let response = gate
            .send_authorized(
                gate.request(Method::POST, &format!("/notes/{}/files", note_id))
                    .multipart(upload.into_form()),
            )
            .await?;
        let attachment: FileAttachment = decode(response).await?;
        tracing::info!("Attached {} to note {}", filename, note_id);
        Ok(attachment)
    }

    /// Attach files one after another, in the order given.
    ///
    /// Stops at the first failure. Uploads that already went through stay on
    /// the backend; nothing is rolled back.
    pub async fn upload_files(
        &self,
        note_id: i64,
        uploads: Vec<FileUpload>,
    ) -> Result<Vec<FileAttachment>, ClientError> {
        let total = uploads.len();
        let mut attached = Vec::with_capacity(total);
        for (index, upload) in uploads.into_iter().enumerate() {
            match self.upload_file(note_id, upload).await {
                Ok(attachment) => attached.push(attachment),
                Err(e) => {
                    tracing::warn!(
                        "Upload {}/{} to note {} failed after {} succeeded: {}",
                        index + 1,
                        total,
                        note_id,
                        attached.len(),
                        e
                    );
                    return Err(e);
                }
            }
        }
        Ok(attached)
    }

    /// DELETE /files/:id?note_id= - Remove an attachment from a note.
    pub async fn delete_file(&self, note_id: i64, file_id: &str) -> Result<(), ClientError> {
        let gate = self.gatekeeper();
        let url = gate.segment_url("/files", file_id)?;
        let response = gate
            .send_authorized(
                gate.http()
                    .request(Method::DELETE, url)
                    .query(&[("note_id", note_id)]),
            )
            .await?;
        ensure_success(response).await?;
        tracing::info!("Removed file {} from note {}", file_id, note_id);
        Ok(())
    }

    /// GET /files/:path - Fetch an attachment's bytes.
    pub async fn download_file(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let gate = self.gatekeeper();
        let url = gate.segment_url("/files", path)?;
        let response = gate
            .send_authorized(gate.http().request(Method::GET, url))
            .await?;
        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Link a rendered attachment points at.
    pub fn file_url(&self, path: &str) -> String {
        match self.gatekeeper().segment_url("/files", path) {
            Ok(url) => url.into(),
            Err(e) => {
                tracing::warn!("Could not build link for file {}: {}", path, e);
                self.gatekeeper().config().endpoint("/files")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_upload_from_path_uses_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, b"quarterly").unwrap();

        let upload = FileUpload::from_path(&path).await.unwrap();

        assert_eq!(upload.filename, "report.txt");
        assert_eq!(upload.bytes, b"quarterly");
    }

    #[tokio::test]
    async fn test_upload_from_missing_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = FileUpload::from_path(dir.path().join("nope.bin"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
    }
}
