//! [`EncryptionKey`]: the single 32-byte AES-256 key shared by every codec call.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::CodecError;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Number of SHA-256 bytes shown by [`EncryptionKey::fingerprint`].
const FINGERPRINT_LEN: usize = 8;

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// A value of this type is always a valid AES-256 key; the length is checked
/// once at construction. When dropped, the memory is overwritten with zeroes.
#[derive(Clone)]
pub struct EncryptionKey(Box<[u8; KEY_LEN]>);

impl EncryptionKey {
    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Configuration`] if `bytes` is not [`KEY_LEN`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != KEY_LEN {
            return Err(CodecError::Configuration(format!(
                "expected {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Parse a key from its hex form (64 hex characters).
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Configuration`] if the input is empty, is not
    /// valid hex, or does not decode to [`KEY_LEN`] bytes.
    pub fn from_hex(hex_key: &str) -> Result<Self, CodecError> {
        let hex_key = hex_key.trim();
        if hex_key.is_empty() {
            return Err(CodecError::Configuration("ENCRYPTION_KEY is not set".into()));
        }
        let bytes = Zeroizing::new(hex::decode(hex_key).map_err(|_| {
            CodecError::Configuration("ENCRYPTION_KEY is not valid hex".into())
        })?);
        Self::from_bytes(&bytes)
    }

    /// Generate a fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut buf = Box::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut buf[..]);
        Self(buf)
    }

    /// Hex form of the key, suitable for `ENCRYPTION_KEY`.
    ///
    /// Only the `keygen` command should ever call this.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0[..])
    }

    /// Short, non-reversible identifier of the key.
    ///
    /// Safe to log: lets operators confirm two processes share a key without
    /// exposing it.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.0[..]);
        hex::encode(&digest[..FINGERPRINT_LEN])
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl ZeroizeOnDrop for EncryptionKey {}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("EncryptionKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn from_hex_accepts_64_hex_chars() {
        let key = EncryptionKey::from_hex(HEX_KEY).unwrap();
        assert_eq!(key.as_bytes()[31], 0x1f);
        assert_eq!(key.to_hex(), HEX_KEY);
    }

    #[test]
    fn from_hex_trims_whitespace() {
        let key = EncryptionKey::from_hex(&format!("  {HEX_KEY}\n")).unwrap();
        assert_eq!(key.to_hex(), HEX_KEY);
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let err = EncryptionKey::from_hex("").unwrap_err();
        assert!(matches!(err, CodecError::Configuration(_)));
    }

    #[test]
    fn short_key_rejected() {
        // 16 bytes: a valid AES-128 key, but not AES-256.
        let err = EncryptionKey::from_hex(&HEX_KEY[..32]).unwrap_err();
        assert!(matches!(err, CodecError::Configuration(ref m) if m.contains("got 16")));
    }

    #[test]
    fn non_hex_rejected() {
        let bad = "zz".repeat(KEY_LEN);
        assert!(matches!(
            EncryptionKey::from_hex(&bad),
            Err(CodecError::Configuration(_))
        ));
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        assert!(EncryptionKey::from_bytes(&[0u8; 31]).is_err());
        assert!(EncryptionKey::from_bytes(&[0u8; 33]).is_err());
        assert!(EncryptionKey::from_bytes(&[0u8; KEY_LEN]).is_ok());
    }

    #[test]
    fn generated_keys_differ() {
        let a = EncryptionKey::generate();
        let b = EncryptionKey::generate();
        assert_ne!(a.to_hex(), b.to_hex());
        assert_eq!(a.to_hex().len(), KEY_LEN * 2);
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let key = EncryptionKey::from_hex(HEX_KEY).unwrap();
        let fp = key.fingerprint();
        assert_eq!(fp.len(), FINGERPRINT_LEN * 2);
        assert_eq!(fp, EncryptionKey::from_hex(HEX_KEY).unwrap().fingerprint());
        assert_ne!(fp, EncryptionKey::generate().fingerprint());
    }

    #[test]
    fn key_is_zeroize_on_drop() {
        fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<EncryptionKey>();

        let mut key = EncryptionKey::from_hex(HEX_KEY).unwrap();
        key.0.zeroize();
        assert_eq!(*key.as_bytes(), [0u8; KEY_LEN]);
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = EncryptionKey::from_hex(HEX_KEY).unwrap();
        let shown = format!("{key:?}");
        assert!(shown.contains("REDACTED"));
        assert!(!shown.contains("0a0b"));
    }
}
