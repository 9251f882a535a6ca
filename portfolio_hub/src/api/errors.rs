//! HTTP client error types.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by [`ApiClient`](super::ApiClient)
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (connection, timeout, TLS)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("Server responded with {status}: {body}")]
    Status { status: StatusCode, body: Value },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Access token expired and the refresh token was rejected.
    ///
    /// Tokens have been cleared and the host sent to the login view; the
    /// wrapped error is the refresh failure.
    #[error("Session is no longer valid: {0}")]
    SessionInvalid(Box<ApiError>),
}

impl ApiError {
    /// Build a status error from a rejected response, keeping its body
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        match response.bytes().await {
            Ok(bytes) => {
                let body = serde_json::from_slice(&bytes)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
                ApiError::Status { status, body }
            }
            Err(e) => ApiError::Transport(e),
        }
    }

    /// HTTP status of a server rejection
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// JSON body of a server rejection
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_session_invalid(&self) -> bool {
        matches!(self, ApiError::SessionInvalid(_))
    }

    /// The conventional `detail` message of an error body
    pub fn detail(&self) -> Option<&str> {
        self.body()?.get("detail")?.as_str()
    }
}

/// Result type for HTTP client operations
pub type ApiResult<T> = Result<T, ApiError>;
