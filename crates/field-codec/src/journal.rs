//! Journal entry helpers: the fixed set of entry fields stored encrypted.

use crate::error::CodecError;
use crate::fields::{Decrypted, FieldCodec, Record};

/// Profile name under which the journal field list is registered.
pub const JOURNAL_PROFILE: &str = "journal";

/// Journal entry fields that are only ever persisted encrypted.
pub const JOURNAL_ENCRYPTED_FIELDS: [&str; 5] = ["title", "content", "tags", "mood", "journalType"];

impl FieldCodec {
    /// Encrypt a journal entry before it is written.
    ///
    /// # Errors
    ///
    /// See [`FieldCodec::encrypt_fields`].
    pub fn encrypt_journal(&self, entry: &Record) -> Result<Record, CodecError> {
        self.encrypt_fields(entry, &JOURNAL_ENCRYPTED_FIELDS)
    }

    /// Decrypt a journal entry after it is read.
    pub fn decrypt_journal(&self, entry: &Record) -> Decrypted {
        self.decrypt_fields(entry, &JOURNAL_ENCRYPTED_FIELDS)
    }
}
