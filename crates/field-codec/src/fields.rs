//! Record-level transform: encrypt or decrypt a named set of top-level fields.
//!
//! # Value convention
//!
//! Before encryption a field value is turned into a string: strings as-is,
//! numbers and booleans via their JSON text, arrays and objects via
//! `serde_json`. After decryption the string is parsed as JSON and the parsed
//! value is used if parsing succeeds. Consequently a string that is itself
//! valid JSON (`"42"`, `"true"`, `"[1]"`) comes back as the parsed value.
//!
//! `null` values and empty strings are never encrypted.

use serde_json::Value;
use tracing::warn;

use crate::cipher::{self, EncodedCiphertext};
use crate::error::{CipherError, CodecError};
use crate::key::EncryptionKey;

/// A single JSON record, keyed by field name.
pub type Record = serde_json::Map<String, Value>;

/// A listed field that could not be decrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: String,
    pub error: CipherError,
}

/// Outcome of [`FieldCodec::decrypt_fields`].
///
/// `record` always has the full key set of the input. Fields listed in
/// `failures` still hold their stored (encrypted) value.
#[derive(Debug, Clone)]
pub struct Decrypted {
    pub record: Record,
    pub failures: Vec<FieldFailure>,
}

impl Decrypted {
    /// `true` if every listed field decrypted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Encrypts and decrypts named fields of a [`Record`] under one fixed key.
///
/// Stateless apart from the key; cheap to clone and safe to share across
/// threads.
#[derive(Clone, Debug)]
pub struct FieldCodec {
    key: EncryptionKey,
}

impl FieldCodec {
    /// Create a codec bound to `key` for its whole lifetime.
    pub fn new(key: EncryptionKey) -> Self {
        Self { key }
    }

    /// Create a codec from a hex-encoded key.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Configuration`] if the key is missing or malformed.
    pub fn from_hex_key(hex_key: &str) -> Result<Self, CodecError> {
        EncryptionKey::from_hex(hex_key).map(Self::new)
    }

    /// Fingerprint of the bound key; see [`EncryptionKey::fingerprint`].
    pub fn key_fingerprint(&self) -> String {
        self.key.fingerprint()
    }

    /// Return a copy of `record` with every listed, non-null field encrypted.
    ///
    /// Unlisted fields, absent fields, `null` values and empty strings are
    /// copied unchanged. A name listed twice is encrypted once.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Serialize`] if a structured value cannot be
    /// serialised. The record must not be persisted in that case.
    pub fn encrypt_fields<S: AsRef<str>>(
        &self,
        record: &Record,
        fields: &[S],
    ) -> Result<Record, CodecError> {
        let mut out = record.clone();
        for name in distinct(fields) {
            let Some(value) = out.get_mut(name) else {
                continue;
            };
            let Some(plaintext) = plaintext_of(name, value)? else {
                continue;
            };
            *value = Value::String(cipher::encrypt_str(&plaintext, &self.key).to_string());
        }
        Ok(out)
    }

    /// Return a copy of `record` with every listed encrypted field restored.
    ///
    /// Only non-empty string values are decrypted; anything else passes
    /// through. A field that fails to parse or decrypt keeps its stored value,
    /// is logged at `warn` by name, and is reported in [`Decrypted::failures`].
    /// The remaining fields are still decrypted.
    pub fn decrypt_fields<S: AsRef<str>>(&self, record: &Record, fields: &[S]) -> Decrypted {
        let mut out = record.clone();
        let mut failures = Vec::new();

        for name in distinct(fields) {
            let outcome = match out.get(name) {
                Some(Value::String(stored)) if !stored.is_empty() => self.open(stored),
                _ => continue,
            };
            match outcome {
                Ok(value) => {
                    out.insert(name.to_owned(), value);
                }
                Err(error) => {
                    warn!(
                        field = name,
                        code = error.code(),
                        error = %error,
                        "failed to decrypt field; keeping stored value"
                    );
                    failures.push(FieldFailure {
                        field: name.to_owned(),
                        error,
                    });
                }
            }
        }

        Decrypted {
            record: out,
            failures,
        }
    }

    fn open(&self, stored: &str) -> Result<Value, CipherError> {
        let encoded: EncodedCiphertext = stored.parse()?;
        let plaintext = cipher::decrypt_str(&encoded, &self.key)?;
        Ok(match serde_json::from_str(&plaintext) {
            Ok(parsed) => parsed,
            Err(_) => Value::String(plaintext),
        })
    }
}

/// String form of a field value, or `None` if the value is left as-is.
fn plaintext_of(field: &str, value: &Value) -> Result<Option<String>, CodecError> {
    Ok(match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => {
            Some(
                serde_json::to_string(value).map_err(|source| CodecError::Serialize {
                    field: field.to_owned(),
                    source,
                })?,
            )
        }
    })
}

/// Field names in first-seen order with duplicates removed.
fn distinct<S: AsRef<str>>(fields: &[S]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(fields.len());
    for name in fields {
        let name = name.as_ref();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
