//! Errors surfaced by the HTTP client facade.
//!
//! The facade never swallows an error: it does its bookkeeping and hands the
//! original failure back. Callers decide how to present it, typically with
//! [`ApiError::message_or`].

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::credentials::CredentialError;

/// Failure of a call made through [`ApiClient`](crate::client::ApiClient).
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// No response within the configured timeout.
    #[error("Request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    /// The API rejected the credentials (HTTP 401).
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("session expired"))]
    Unauthorized {
        /// Message from the API's error payload, if any.
        message: Option<String>,
    },

    /// Any other non-success status.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status {
        status: StatusCode,
        /// Message from the API's error payload, if any.
        message: Option<String>,
    },

    /// The request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request path did not form a valid URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The credential store could not be read.
    #[error("Credential store error: {0}")]
    Credentials(#[from] CredentialError),
}

impl ApiError {
    /// HTTP status of the response, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `error` message from the API's structured error payload.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The API's message, or `fallback` when it sent none.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether the failure happened before any response arrived.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// Build the error for a non-success response.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let message = error_message(body);
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized { message }
        } else {
            Self::Status { status, message }
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Network(err)
        }
    }
}

/// Structured error payload: `{ "error": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
