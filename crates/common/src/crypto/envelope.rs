//! Content-identifier envelopes
//!
//! The vault never stores where a document lives. Clients seal the content
//! identifier with AES-256-GCM under their signature-derived key and hand the
//! server an `Envelope`: the ciphertext (with the 16 byte tag appended) and
//! the 12 byte nonce, kept separate so each can travel as its own base64
//! string.

use aes_gcm::aead::Aead;
use aes_gcm::Nonce;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::derived_key::DerivedKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;
/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("failed to generate nonce: {0}")]
    Nonce(String),
    #[error("encrypt error")]
    Encrypt,
}

/// Opening an envelope failed. No plaintext is ever returned alongside one
/// of these.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecryptionError {
    #[error("malformed envelope: {0}")]
    Malformed(String),
    #[error("cannot decrypt: wrong key or tampered envelope")]
    Authentication,
    #[error("decrypted content identifier is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    ciphertext: Vec<u8>,
    nonce: [u8; NONCE_SIZE],
}

impl Envelope {
    /// Encrypt a content identifier under `key` with a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Only fails if the system RNG is unavailable.
    pub fn seal(content_id: &str, key: &DerivedKey) -> Result<Self, EnvelopeError> {
        let mut nonce = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce).map_err(|e| EnvelopeError::Nonce(e.to_string()))?;

        let ciphertext = key
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), content_id.as_bytes())
            .map_err(|_| EnvelopeError::Encrypt)?;

        Ok(Self { ciphertext, nonce })
    }

    /// Decrypt and authenticate the content identifier.
    ///
    /// # Errors
    ///
    /// Returns `DecryptionError::Authentication` when the key is wrong or the
    /// ciphertext or nonce was modified.
    pub fn open(&self, key: &DerivedKey) -> Result<String, DecryptionError> {
        let plaintext = key
            .cipher()
            .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_ref())
            .map_err(|_| DecryptionError::Authentication)?;

        String::from_utf8(plaintext).map_err(|_| DecryptionError::InvalidUtf8)
    }

    /// Rebuild an envelope from stored parts.
    pub fn from_parts(ciphertext: Vec<u8>, nonce: &[u8]) -> Result<Self, DecryptionError> {
        let nonce: [u8; NONCE_SIZE] = nonce.try_into().map_err(|_| {
            DecryptionError::Malformed(format!(
                "nonce must be {} bytes, got {}",
                NONCE_SIZE,
                nonce.len()
            ))
        })?;
        if ciphertext.len() < TAG_SIZE {
            return Err(DecryptionError::Malformed(
                "ciphertext too short for authentication tag".into(),
            ));
        }
        Ok(Self { ciphertext, nonce })
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    /// Base64 form for transport and storage.
    pub fn encode(&self) -> EncodedEnvelope {
        EncodedEnvelope {
            encrypted_cid: STANDARD.encode(&self.ciphertext),
            iv: STANDARD.encode(self.nonce),
        }
    }
}

/// An envelope as two independent base64 strings.
///
/// The server treats both fields as opaque text: it cannot check them without
/// the owner's key, so decoding errors surface when the client opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedEnvelope {
    #[serde(rename = "encryptedCID")]
    pub encrypted_cid: String,
    pub iv: String,
}

impl EncodedEnvelope {
    pub fn decode(&self) -> Result<Envelope, DecryptionError> {
        let ciphertext = STANDARD
            .decode(self.encrypted_cid.trim())
            .map_err(|e| DecryptionError::Malformed(format!("encrypted CID: {}", e)))?;
        let nonce = STANDARD
            .decode(self.iv.trim())
            .map_err(|e| DecryptionError::Malformed(format!("iv: {}", e)))?;
        Envelope::from_parts(ciphertext, &nonce)
    }

    /// Decode and decrypt in one step.
    pub fn open(&self, key: &DerivedKey) -> Result<String, DecryptionError> {
        self.decode()?.open(key)
    }
}
