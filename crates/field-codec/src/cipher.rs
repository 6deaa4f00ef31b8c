//! AES-256-CBC encryption and decryption of individual string values.
//!
//! **No integrity tag.** CBC with PKCS#7 padding detects some corruption via
//! the padding check, but a flipped bit can also decrypt silently to wrong
//! plaintext. The format matches ciphertext already held in storage and must
//! stay readable.
//!
//! **Fresh IV per call.** Every encryption draws 16 bytes from the OS CSPRNG.
//! Never reuse an IV under the same key.

use std::fmt;
use std::str::FromStr;

use aes::Aes256;
use cbc::cipher::{
    block_padding::Pkcs7, generic_array::GenericArray, BlockDecryptMut, BlockEncryptMut,
    KeyIvInit,
};
use rand::{rngs::OsRng, RngCore};

use crate::error::CipherError;
use crate::key::EncryptionKey;

/// Byte length of a CBC initialisation vector (one AES block).
pub const IV_LEN: usize = 16;

/// AES block size in bytes.
const BLOCK_LEN: usize = 16;

/// Separator between the IV and the ciphertext in the encoded form.
pub const SEPARATOR: char = ':';

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// A parsed, encrypted field value.
///
/// The string representation is `<hex(iv)>:<hex(ciphertext)>`, lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCiphertext {
    /// Raw IV bytes.
    pub iv: [u8; IV_LEN],
    /// Raw, padded ciphertext bytes.
    pub ciphertext: Vec<u8>,
}

impl fmt::Display for EncodedCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}",
            hex::encode(self.iv),
            hex::encode(&self.ciphertext)
        )
    }
}

impl FromStr for EncodedCiphertext {
    type Err = CipherError;

    /// Parse a stored `<iv_hex>:<ciphertext_hex>` string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedCiphertext`] if there are not exactly two
    /// parts, either part is not hex, the IV is not [`IV_LEN`] bytes, or the
    /// ciphertext is not a non-empty whole number of AES blocks.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(SEPARATOR);
        let (iv_hex, ciphertext_hex) = match (parts.next(), parts.next(), parts.next()) {
            (Some(iv), Some(ct), None) => (iv, ct),
            _ => {
                return Err(CipherError::MalformedCiphertext(
                    "expected <iv_hex>:<ciphertext_hex>",
                ))
            }
        };

        let iv_bytes = hex::decode(iv_hex)
            .map_err(|_| CipherError::MalformedCiphertext("iv is not valid hex"))?;
        if iv_bytes.len() != IV_LEN {
            return Err(CipherError::MalformedCiphertext("iv must be 16 bytes"));
        }
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&iv_bytes);

        let ciphertext = hex::decode(ciphertext_hex)
            .map_err(|_| CipherError::MalformedCiphertext("ciphertext is not valid hex"))?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CipherError::MalformedCiphertext(
                "ciphertext is not a whole number of AES blocks",
            ));
        }

        Ok(Self { iv, ciphertext })
    }
}

/// Encrypt a UTF-8 string under `key` with a fresh random IV.
///
/// Infallible: [`EncryptionKey`] is always 32 bytes and the IV is generated here.
pub fn encrypt_str(plaintext: &str, key: &EncryptionKey) -> EncodedCiphertext {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(
        GenericArray::from_slice(key.as_bytes()),
        GenericArray::from_slice(&iv),
    )
    .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    EncodedCiphertext { iv, ciphertext }
}

/// Decrypt an [`EncodedCiphertext`] back to a UTF-8 string.
///
/// # Errors
///
/// Returns [`CipherError::Cryptographic`] if the padding is invalid or the
/// plaintext is not UTF-8. Both usually mean a wrong key or tampered bytes.
pub fn decrypt_str(encoded: &EncodedCiphertext, key: &EncryptionKey) -> Result<String, CipherError> {
    let plaintext = Aes256CbcDec::new(
        GenericArray::from_slice(key.as_bytes()),
        GenericArray::from_slice(&encoded.iv),
    )
    .decrypt_padded_vec_mut::<Pkcs7>(&encoded.ciphertext)
    .map_err(|_| CipherError::Cryptographic("invalid padding"))?;

    String::from_utf8(plaintext)
        .map_err(|_| CipherError::Cryptographic("plaintext is not valid UTF-8"))
}
