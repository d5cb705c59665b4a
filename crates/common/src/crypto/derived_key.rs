//! Signature-derived symmetric keys
//!
//! A `DerivedKey` is `SHA-256(signature)` imported directly as an AES-256-GCM
//! key. Nothing about it is stored: the client signs the challenge again
//! whenever it needs the key, which only works because Ed25519 signatures are
//! deterministic for a given key and message.

use std::fmt;

use aes_gcm::{Aes256Gcm, Key, KeyInit};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::challenge::Challenge;
use super::signer::{MessageSigner, SignerError};
use super::Signature;

/// Size of the derived AES-256-GCM key in bytes
pub const DERIVED_KEY_SIZE: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum KeyDerivationError {
    #[error("wallet does not support message signing")]
    SigningUnavailable,
    #[error("wallet failed to sign the challenge: {0}")]
    SigningFailed(String),
}

impl From<SignerError> for KeyDerivationError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::Unsupported => KeyDerivationError::SigningUnavailable,
            SignerError::Rejected(reason) => KeyDerivationError::SigningFailed(reason),
        }
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; DERIVED_KEY_SIZE]);

impl DerivedKey {
    /// Hash a signature into key material.
    pub fn from_signature(signature: &Signature) -> Self {
        let digest = Sha256::digest(signature.to_bytes());
        let mut key = [0u8; DERIVED_KEY_SIZE];
        key.copy_from_slice(&digest);
        Self(key)
    }

    /// Ask `signer` to sign `challenge` and derive the key from the result.
    ///
    /// # Errors
    ///
    /// Returns `KeyDerivationError` when the wallet cannot or will not sign.
    pub fn derive(
        signer: &dyn MessageSigner,
        challenge: &Challenge,
    ) -> Result<Self, KeyDerivationError> {
        let signature = signer.sign_message(challenge.as_bytes())?;
        Ok(Self::from_signature(&signature))
    }

    pub(crate) fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::{SecretKey, WatchOnly};

    #[test]
    fn test_same_signature_same_key() {
        let wallet = SecretKey::generate().unwrap();
        let challenge = Challenge::default();

        let first = DerivedKey::derive(&wallet, &challenge).unwrap();
        let second = DerivedKey::derive(&wallet, &challenge).unwrap();
        assert_eq!(first.0, second.0);
    }

    #[test]
    fn test_key_is_sha256_of_signature() {
        let wallet = SecretKey::generate().unwrap();
        let signature = wallet.sign(b"some challenge");
        let key = DerivedKey::from_signature(&signature);

        let expected = Sha256::digest(signature.to_bytes());
        assert_eq!(key.0.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_different_wallet_or_challenge_differs() {
        let alice = SecretKey::generate().unwrap();
        let bob = SecretKey::generate().unwrap();
        let challenge = Challenge::default();
        let other_challenge = Challenge::new("a different message");

        let alice_key = DerivedKey::derive(&alice, &challenge).unwrap();
        let bob_key = DerivedKey::derive(&bob, &challenge).unwrap();
        let alice_other = DerivedKey::derive(&alice, &other_challenge).unwrap();

        assert_ne!(alice_key.0, bob_key.0);
        assert_ne!(alice_key.0, alice_other.0);
    }

    #[test]
    fn test_watch_only_wallet_cannot_derive() {
        let wallet = WatchOnly(SecretKey::generate().unwrap().public());
        let result = DerivedKey::derive(&wallet, &Challenge::default());
        assert!(matches!(result, Err(KeyDerivationError::SigningUnavailable)));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = DerivedKey::from_signature(&SecretKey::generate().unwrap().sign(b"x"));
        assert_eq!(format!("{:?}", key), "DerivedKey(..)");
    }
}
