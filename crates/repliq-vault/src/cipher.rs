// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token cipher: string-level encrypt/decrypt for stored OAuth tokens.
//!
//! Tokens are stored as `hex(nonce || ciphertext_with_tag)` in the
//! connections table. The key is a 32-byte value supplied by configuration
//! (`vault.key_hex` / `REPLIQ_VAULT_KEY_HEX`); there is no interactive
//! passphrase in a server process.

use zeroize::Zeroizing;

use repliq_core::RepliqError;

use crate::crypto;

/// Holds the AES-256-GCM key in memory. Debug output omits the key.
pub struct TokenCipher {
    key: Zeroizing<[u8; 32]>,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl TokenCipher {
    /// Build a cipher from a 64-character hex key.
    pub fn from_hex(key_hex: &str) -> Result<Self, RepliqError> {
        let bytes = hex::decode(key_hex.trim())
            .map_err(|_| RepliqError::Token("vault key is not valid hex".to_string()))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| RepliqError::Token("vault key must be 32 bytes".to_string()))?;
        Ok(Self {
            key: Zeroizing::new(key),
        })
    }

    /// Generate a cipher with a fresh random key (tests and `keygen`).
    pub fn generate() -> Result<Self, RepliqError> {
        Ok(Self {
            key: Zeroizing::new(crypto::generate_random_key()?),
        })
    }

    /// Encrypt a token to its stored representation.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, RepliqError> {
        let (ciphertext, nonce) = crypto::seal(&self.key, plaintext.as_bytes())?;
        let mut out = Vec::with_capacity(nonce.len() + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(hex::encode(out))
    }

    /// Decrypt a stored token. Fails with a `Token` error on wrong key,
    /// truncated input, or tampered ciphertext.
    pub fn decrypt(&self, stored: &str) -> Result<String, RepliqError> {
        let bytes = hex::decode(stored)
            .map_err(|_| RepliqError::Token("stored token is not valid hex".to_string()))?;
        if bytes.len() < 12 {
            return Err(RepliqError::Token("stored token too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(12);
        let nonce: [u8; 12] = nonce_bytes.try_into().expect("length checked above");
        let plaintext = crypto::open(&self.key, &nonce, ciphertext)?;
        String::from_utf8(plaintext)
            .map_err(|_| RepliqError::Token("decrypted token is not UTF-8".to_string()))
    }
}
