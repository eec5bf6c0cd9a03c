//! Error handling module for the notes client.
//!
//! Provides the client error taxonomy and the mapping from backend responses.

use reqwest::StatusCode;
use serde::Deserialize;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
}

/// Fallback shown when the backend gives no usable detail.
pub const GENERIC_SERVER_MESSAGE: &str = "Server error";

/// Client error type.
#[derive(Debug)]
pub enum ClientError {
    /// Bad form input, locally detected or reported by the server
    Validation(String),
    /// Missing, expired or rejected credential
    Unauthenticated(String),
    /// The request did not complete
    Network(String),
    /// Referenced note or file is absent
    NotFound(String),
    /// Any other non-success response
    Server { status: u16, message: String },
    /// Credential store could not be read or written
    Storage(String),
    /// Response body did not match the expected shape
    Decode(String),
}

impl ClientError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => codes::VALIDATION_ERROR,
            ClientError::Unauthenticated(_) => codes::UNAUTHENTICATED,
            ClientError::Network(_) => codes::NETWORK_ERROR,
            ClientError::NotFound(_) => codes::NOT_FOUND,
            ClientError::Server { .. } => codes::SERVER_ERROR,
            ClientError::Storage(_) => codes::STORAGE_ERROR,
            ClientError::Decode(_) => codes::DECODE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Unauthenticated(msg) => msg.clone(),
            ClientError::Network(msg) => msg.clone(),
            ClientError::NotFound(msg) => msg.clone(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Storage(msg) => msg.clone(),
            ClientError::Decode(msg) => msg.clone(),
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClientError::Unauthenticated(_))
    }

    /// Map a non-success status and its `detail` message onto the taxonomy.
    pub fn from_status(status: StatusCode, detail: Option<String>) -> Self {
        let message = detail.unwrap_or_else(|| GENERIC_SERVER_MESSAGE.to_string());
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthenticated(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            _ => ClientError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Consume an unsuccessful response and turn it into an error.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let detail = match response.text().await {
            Ok(body) => extract_detail(&body),
            Err(e) => {
                tracing::warn!("Failed to read error body: {}", e);
                None
            }
        };
        tracing::debug!("Backend answered {} ({:?})", status, detail);
        Self::from_status(status, detail)
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        // The URL may carry credentials in its query string.
        let err = err.without_url();
        tracing::error!("Request error: {:?}", err);
        if err.is_decode() {
            ClientError::Decode(format!("Unexpected response: {}", err))
        } else {
            ClientError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        ClientError::Decode(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {:?}", err);
        ClientError::Storage(format!("I/O error: {}", err))
    }
}

impl From<tempfile::PersistError> for ClientError {
    fn from(err: tempfile::PersistError) -> Self {
        tracing::error!("Persist error: {:?}", err.error);
        ClientError::Storage(format!("Could not replace credential file: {}", err.error))
    }
}

/// Error body as sent by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Pull a human readable message out of an error body.
///
/// `detail` is either a plain string or a list of validation entries carrying `msg`.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_detail() {
        assert_eq!(
            extract_detail(r#"{"detail":"Username already exists"}"#),
            Some("Username already exists".to_string())
        );
    }

    #[test]
    fn test_extract_validation_list_detail() {
        let body = r#"{"detail":[{"loc":["body","username"],"msg":"field required","type":"value_error.missing"}]}"#;
        assert_eq!(extract_detail(body), Some("field required".to_string()));
    }

    #[test]
    fn test_extract_detail_missing_or_garbage() {
        assert_eq!(extract_detail(r#"{"message":"nope"}"#), None);
        assert_eq!(extract_detail("<html>502</html>"), None);
        assert_eq!(extract_detail(r#"{"detail":""}"#), None);
    }

    #[test]
    fn test_status_mapping() {
        let err = ClientError::from_status(StatusCode::UNAUTHORIZED, None);
        assert!(err.is_unauthenticated());
        assert_eq!(err.message(), GENERIC_SERVER_MESSAGE);

        let err = ClientError::from_status(StatusCode::NOT_FOUND, Some("Note not found".into()));
        assert_eq!(err.error_code(), codes::NOT_FOUND);

        let err = ClientError::from_status(StatusCode::BAD_REQUEST, Some("taken".into()));
        assert_eq!(err.to_string(), "VALIDATION_ERROR: taken");

        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, None);
        assert!(matches!(err, ClientError::Server { status: 502, .. }));
    }
}
