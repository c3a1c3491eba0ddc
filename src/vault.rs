// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Authenticated encryption of original PII values.
//!
//! [`CipherVault`] wraps AES-256-GCM under a process-wide key. Ciphertexts
//! carry a leading scheme version byte and the nonce, then a base64 pass so
//! the result is safe to drop into Redis string values and JSON files:
//!
//! ```text
//! base64( version(1) || nonce(12) || aead ciphertext+tag )
//! ```
//!
//! Because the scheme is authenticated, a corrupted or forged ciphertext
//! (or one produced under a different key) fails decryption cleanly rather
//! than silently misdecoding. Key rotation is out of scope here: changing
//! the key makes every previously stored ciphertext permanently
//! undecryptable, so callers must treat [`VaultError`] from `decrypt` as
//! "value unrecoverable", never as retryable.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use thiserror::Error;

const SCHEME_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("encryption key must be {KEY_LEN} bytes of base64")]
    InvalidKey,
    #[error("ciphertext is malformed or truncated")]
    Malformed,
    #[error("unsupported ciphertext scheme version {0}")]
    UnsupportedVersion(u8),
    #[error("decryption failed (corrupted ciphertext or wrong key)")]
    Decrypt,
    #[error("encryption failed")]
    Encrypt,
    #[error("decrypted value is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Authenticated symmetric encryption under a process-wide secret key.
pub struct CipherVault {
    cipher: Aes256Gcm,
}

impl CipherVault {
    /// Create a vault from raw key bytes.
    #[must_use]
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(&key.into()),
        }
    }

    /// Create a vault from a base64-encoded 32-byte key (config-sourced).
    pub fn from_base64(encoded: &str) -> Result<Self, VaultError> {
        let bytes = STANDARD.decode(encoded).map_err(|_| VaultError::InvalidKey)?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| VaultError::InvalidKey)?;
        Ok(Self::new(key))
    }

    /// Generate a fresh random key. Intended for setup tooling and tests;
    /// production keys come in through configuration.
    #[must_use]
    pub fn generate_key() -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt a plaintext value. Each call uses a fresh random nonce, so
    /// two encryptions of the same value yield different ciphertexts.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| VaultError::Encrypt)?;

        let mut framed = Vec::with_capacity(1 + NONCE_LEN + sealed.len());
        framed.push(SCHEME_VERSION);
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&sealed);

        Ok(STANDARD.encode(framed))
    }

    /// Decrypt a ciphertext produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails if the ciphertext is malformed, truncated, carries an unknown
    /// scheme version, or was produced under a different key.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, VaultError> {
        let framed = STANDARD.decode(ciphertext).map_err(|_| VaultError::Malformed)?;
        if framed.len() < 1 + NONCE_LEN {
            return Err(VaultError::Malformed);
        }

        let version = framed[0];
        if version != SCHEME_VERSION {
            return Err(VaultError::UnsupportedVersion(version));
        }

        let nonce = Nonce::from_slice(&framed[1..1 + NONCE_LEN]);
        let plain = self
            .cipher
            .decrypt(nonce, &framed[1 + NONCE_LEN..])
            .map_err(|_| VaultError::Decrypt)?;

        Ok(String::from_utf8(plain)?)
    }
}
