//! Authentication error types.

use super::validation::FieldErrors;
use crate::api::ApiError;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form rejected before any request was sent
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    /// Backend rejected the call or could not be reached
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Stop requested without an impersonation marker
    #[error("Not impersonating any user")]
    NotImpersonating,

    /// Operation needs a signed-in session
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl From<FieldErrors> for AuthError {
    fn from(errors: FieldErrors) -> Self {
        AuthError::Validation(errors)
    }
}

impl AuthError {
    /// Field-level errors, whether raised locally or by the server
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            AuthError::Validation(errors) => errors.clone(),
            AuthError::Api(err) => err.body().map(FieldErrors::from_body).unwrap_or_default(),
            _ => FieldErrors::new(),
        }
    }

    /// Get a message suitable for showing to the user
    ///
    /// Prefers the server's `detail` text; transport and decode failures are
    /// not exposed verbatim.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Validation(errors) => errors.to_string(),
            AuthError::Api(ApiError::SessionInvalid(_)) => {
                "Your session has expired. Please sign in again.".to_string()
            }
            AuthError::Api(err) => match err.detail() {
                Some(detail) => detail.to_string(),
                None => match err {
                    ApiError::Transport(_) => {
                        "Unable to reach the server. Please try again.".to_string()
                    }
                    ApiError::Decode(_) => "Unexpected response from the server".to_string(),
                    _ => {
                        let fields = err.body().map(FieldErrors::from_body).unwrap_or_default();
                        if fields.is_empty() {
                            "Request failed. Please try again.".to_string()
                        } else {
                            fields.to_string()
                        }
                    }
                },
            },
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
