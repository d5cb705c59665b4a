use super::keys::{PublicKey, SecretKey};
use super::Signature;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("wallet does not support message signing")]
    Unsupported,
    #[error("wallet refused to sign: {0}")]
    Rejected(String),
}

/// Anything able to prove control of a wallet by signing a message.
///
/// Browser wallets, hardware wallets and the local PEM key all fit behind
/// this trait. A wallet that can only expose its address (watch-only) reports
/// `SignerError::Unsupported`.
///
/// Signatures must be deterministic: document keys are derived from them.
pub trait MessageSigner: Send + Sync {
    fn public_key(&self) -> PublicKey;

    fn sign_message(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

impl MessageSigner for SecretKey {
    fn public_key(&self) -> PublicKey {
        self.public()
    }

    fn sign_message(&self, message: &[u8]) -> Result<Signature, SignerError> {
        Ok(self.sign(message))
    }
}

/// A wallet connected for its address only.
#[derive(Debug, Clone, Copy)]
pub struct WatchOnly(pub PublicKey);

impl MessageSigner for WatchOnly {
    fn public_key(&self) -> PublicKey {
        self.0
    }

    fn sign_message(&self, _message: &[u8]) -> Result<Signature, SignerError> {
        Err(SignerError::Unsupported)
    }
}
