//! Common error types shared across crates.

use thiserror::Error;

use crate::protocol::ErrorResponse;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::UnknownProfile`] → 400
/// - [`ServiceError::EncryptionFailure`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed, e.g. a missing or non-ASCII profile header.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request named a record profile the service does not know.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// A record could not be encrypted and must not be persisted.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) | ServiceError::UnknownProfile(_) => 400,
            ServiceError::EncryptionFailure(_) => 500,
        }
    }

    /// Short machine-readable code placed in [`ErrorResponse::code`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::UnknownProfile(_) => "unknown_profile",
            ServiceError::EncryptionFailure(_) => "encryption_failure",
        }
    }

    /// Build the JSON error body for this error.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.code(), self.to_string())
    }
}
