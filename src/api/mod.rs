//! Typed client for the notes REST endpoints.
//!
//! Every call except the user listing goes through the gatekeeper, so a
//! rejected credential is handled the same way everywhere.

mod files;
mod notes;

pub use files::*;

use std::sync::Arc;

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::errors::ClientError;
use crate::gatekeeper::Gatekeeper;
use crate::models::UserSummary;

/// Notes backend client.
#[derive(Clone)]
pub struct NotesApi {
    gate: Arc<Gatekeeper>,
}

impl NotesApi {
    pub fn new(gate: Arc<Gatekeeper>) -> Self {
        Self { gate }
    }

    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gate
    }

    /// GET /users - List registered users. The endpoint is public.
    pub async fn list_users(&self) -> Result<Vec<UserSummary>, ClientError> {
        let response = self
            .gate
            .request(reqwest::Method::GET, "/users")
            .send()
            .await?;
        decode(response).await
    }
}

/// Fail on any non-success status, carrying the backend's `detail`.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ClientError::from_response(response).await)
    }
}

/// Check the status, then decode the JSON body.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(ensure_success(response).await?.json().await?)
}
