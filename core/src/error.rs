//! Error types for the marketplace API client.
//!
//! # Design
//! Three failure families reach callers: the request never completed
//! (`Transport`), the backend answered with a non-2xx status (`Api`, carrying
//! the message the backend sent), or a client-side check rejected the input
//! before any request was built (`Validation`). The remaining variants cover
//! codec and token-storage failures.

use thiserror::Error;

/// Message used when a non-2xx response carries neither a message nor a
/// status text.
pub const FALLBACK_MESSAGE: &str = "Request failed";

/// Errors returned by the request core, façades and session stores.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        status_text: String,
    },

    /// Input rejected before reaching the network.
    #[error("{0}")]
    Validation(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The server answered successfully but without the payload the call needs.
    #[error("response carried no body")]
    MissingBody,

    /// The token store could not persist or clear the session token.
    #[error("token storage failed: {0}")]
    Storage(String),
}

impl ApiError {
    /// HTTP status for structured API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text suitable for showing next to the action that failed.
    ///
    /// Backend and validation messages pass through verbatim; everything else
    /// collapses into a generic sentence.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { message, .. } | ApiError::Validation(message) => message.clone(),
            ApiError::Transport(_) => {
                "Unable to reach the server. Please check your connection and try again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}
