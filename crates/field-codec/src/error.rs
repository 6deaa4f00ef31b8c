//! Error types for the field codec.

use thiserror::Error;

/// Errors that abort a whole codec call.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The encryption key is absent or is not exactly 32 bytes.
    ///
    /// Continuing would corrupt every record written afterwards, so callers
    /// must treat this as fatal.
    #[error("encryption key misconfigured: {0}")]
    Configuration(String),

    /// A field value could not be serialised before encryption.
    #[error("failed to serialise field `{field}`")]
    Serialize {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors scoped to a single stored field value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The stored value does not have the `<iv_hex>:<ciphertext_hex>` shape.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(&'static str),

    /// The value is well-formed but does not decrypt, e.g. wrong key or
    /// tampered bytes caught by the padding check.
    #[error("decryption failed: {0}")]
    Cryptographic(&'static str),
}

impl CipherError {
    /// Short machine-readable code for reports and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            CipherError::MalformedCiphertext(_) => "malformed_ciphertext",
            CipherError::Cryptographic(_) => "cryptographic_failure",
        }
    }
}
