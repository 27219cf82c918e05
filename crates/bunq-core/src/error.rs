//! Errors that can occur when using this SDK

use bunq_api_base::{Error as TransportError, StatusCode};
use bunq_crypto::CryptoError;
use thiserror::Error;

use crate::session::StoreError;

/// The server rejected the request signature. The key used for signing does not belong to the
/// installation, retrying with the same key will not help.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("signature wrong")]
pub struct AuthenticationError;

/// The session handshake failed for a reason other than a rejected signature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Failed to create session: {message}")]
pub struct SessionCreationError {
    /// Response status, `None` when no response was received.
    pub status: Option<StatusCode>,
    /// Server provided description, or a local description of what went wrong.
    pub message: String,
}

/// The server kept rejecting the session after it was renewed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("The session was rejected by the server: {message}")]
pub struct SessionInvalidError {
    #[allow(missing_docs)]
    pub message: String,
}

/// A required field was missing from a server response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("The response received was missing a required field: {0}")]
pub struct MissingFieldError(pub &'static str);

/// Errors from [`SessionManager`](crate::SessionManager) operations.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
    #[error(transparent)]
    Creation(#[from] SessionCreationError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from signed API calls.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    SessionInvalid(#[from] SessionInvalidError),
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error("Received error message from server: [{}] {}", .status, .message)]
    ResponseContent { status: StatusCode, message: String },
}

impl From<StoreError> for CallError {
    fn from(e: StoreError) -> Self {
        Self::Session(SessionError::Store(e))
    }
}

/// Errors from the installation and device registration steps.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error("Received error message from server: [{}] {}", .status, .message)]
    ResponseContent { status: StatusCode, message: String },
}
