//! Symmetric encryption of the sensitive field carried in every notification.
//!
//! AES-256-CBC with PKCS#7 padding. Every call draws a fresh 16-byte IV, so the
//! same plaintext never produces the same ciphertext twice under one key.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub iv: String,
    pub ciphertext: String,
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("initialization vector must be {IV_LEN} bytes, got {0}")]
    InvalidIvLength(usize),
    #[error("decryption failed: bad padding or wrong key")]
    BadPadding,
}

/// Derives the cipher key from configured key material.
///
/// The key is always the SHA-256 digest of the source's UTF-8 bytes, whatever
/// its length, so passphrases and raw 32-byte strings are treated alike.
pub fn derive_key(source: &str) -> EncryptionKey {
    EncryptionKey(Sha256::digest(source.as_bytes()).into())
}

pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> EncryptedPayload {
    encrypt_with_rng(key, plaintext, &mut OsRng)
}

pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    key: &EncryptionKey,
    plaintext: &[u8],
    rng: &mut R,
) -> EncryptedPayload {
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new(&key.0.into(), &iv.into());
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    EncryptedPayload {
        iv: hex::encode(iv),
        ciphertext: hex::encode(ciphertext),
    }
}

pub fn decrypt(key: &EncryptionKey, payload: &EncryptedPayload) -> Result<Vec<u8>, CryptoError> {
    let iv = hex::decode(&payload.iv)?;
    let iv: [u8; IV_LEN] = iv
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidIvLength(iv.len()))?;
    let ciphertext = hex::decode(&payload.ciphertext)?;

    let cipher = Aes256CbcDec::new(&key.0.into(), &iv.into());
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CryptoError::BadPadding)
}
