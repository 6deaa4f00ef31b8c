//! Request and response types exchanged between the vault and its callers.
//!
//! A record is a JSON object. Records travel in batches so a caller can
//! encrypt or decrypt a whole page of stored entries in one round trip.

use serde::{Deserialize, Serialize};

/// A single JSON record as stored by the caller.
pub type Record = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Encrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /encrypt`.
///
/// The fields to encrypt are taken from the record profile named in the
/// `X-Record-Profile` request header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// Plain records about to be persisted.
    pub records: Vec<Record>,
}

/// Successful response body for `POST /encrypt`.
///
/// Records keep their input order. Profile fields hold `<iv_hex>:<ciphertext_hex>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    pub records: Vec<Record>,
}

// ---------------------------------------------------------------------------
// Decrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    /// Records as read back from storage.
    pub records: Vec<Record>,
}

/// Response body for `POST /decrypt`.
///
/// Decryption never fails as a whole: a field that could not be decrypted
/// keeps its stored value and is listed in `failures`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FieldFailureReport>,
}

/// One field of one record that could not be decrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailureReport {
    /// Index of the record in the request batch.
    pub record: usize,
    /// Name of the field that failed.
    pub field: String,
    /// `"malformed_ciphertext"` or `"cryptographic_failure"`.
    pub code: String,
    /// Human-readable description. Never contains field contents.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: String,
    /// Number of record profiles currently registered.
    pub profiles_loaded: usize,
}
