//! AES-256-CBC field-level encryption for journal records.
//!
//! This crate is intentionally free of HTTP and async dependencies. Callers
//! build one [`FieldCodec`] at startup from the configured key and call it
//! immediately before writing a record and immediately after reading one.
//!
//! # Ciphertext format
//!
//! ```text
//! <hex(iv)>:<hex(aes-256-cbc-pkcs7(plaintext))>
//! ```
//!
//! The IV is 16 random bytes drawn per encryption.
//!
//! # Example
//!
//! ```
//! use field_codec::{EncryptionKey, FieldCodec};
//! use serde_json::json;
//!
//! let codec = FieldCodec::new(EncryptionKey::generate());
//! let entry = json!({"title": "Hello", "tags": ["a", "b"], "mood": null});
//! let entry = entry.as_object().unwrap();
//!
//! let stored = codec.encrypt_fields(entry, &["title", "tags", "mood"]).unwrap();
//! let read = codec.decrypt_fields(&stored, &["title", "tags", "mood"]);
//! assert!(read.is_clean());
//! assert_eq!(&read.record, entry);
//! ```

pub mod cipher;
pub mod error;
pub mod fields;
pub mod journal;
pub mod key;

pub use error::{CipherError, CodecError};
pub use fields::{Decrypted, FieldCodec, FieldFailure, Record};
pub use journal::{JOURNAL_ENCRYPTED_FIELDS, JOURNAL_PROFILE};
pub use key::{EncryptionKey, KEY_LEN};
