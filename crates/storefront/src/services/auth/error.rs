//! Authentication error types.

use thiserror::Error;

use crate::credentials::CredentialError;
use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bookstore_core::EmailError),

    /// A required form field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The API rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be read or written.
    #[error("credential store error: {0}")]
    Credentials(#[from] CredentialError),
}

impl AuthError {
    /// Message to show the user, preferring the API's own explanation.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(e) => e.message_or(fallback),
            other => other.to_string(),
        }
    }
}
