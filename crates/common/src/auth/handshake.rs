//! Login attempt state machine
//!
//! ```text
//! Unauthenticated -> SignatureReceived -> Verified -> SessionIssued
//!                                      \-> Rejected
//! ```
//!
//! Each transition consumes the previous state, so a session can only be
//! issued for an attempt that went through verification.

use crate::crypto::{Challenge, PublicKey, Signature, SIGNATURE_SIZE};

use super::identity::{WalletIdentity, WalletRecord};
use super::session::IssuedSession;

/// Why a login attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("malformed public key: {0}")]
    MalformedPublicKey(String),
    #[error("malformed signature: expected {SIGNATURE_SIZE} bytes, got {0}")]
    MalformedSignature(usize),
    #[error("signature does not match public key")]
    SignatureMismatch,
}

/// Verify `signature` over `challenge` for a base58 `public_key`.
///
/// Malformed keys and signatures are failures, never errors of their own.
pub fn verify_challenge(
    challenge: &Challenge,
    public_key: &str,
    signature: &[u8],
) -> Result<PublicKey, RejectReason> {
    let public_key: PublicKey = public_key
        .parse()
        .map_err(|e: crate::crypto::KeyError| RejectReason::MalformedPublicKey(e.to_string()))?;
    let signature = Signature::from_slice(signature)
        .map_err(|_| RejectReason::MalformedSignature(signature.len()))?;

    public_key
        .verify(challenge.as_bytes(), &signature)
        .map_err(|_| RejectReason::SignatureMismatch)?;
    Ok(public_key)
}

#[derive(Debug)]
pub struct Unauthenticated;

#[derive(Debug)]
pub struct SignatureReceived {
    public_key: String,
    signature: Vec<u8>,
}

#[derive(Debug)]
pub struct Verified {
    public_key: PublicKey,
}

#[derive(Debug)]
pub struct SessionIssued {
    pub identity: WalletIdentity,
    pub session: IssuedSession,
    /// The wallet was registered by this attempt
    pub registered: bool,
}

#[derive(Debug)]
pub struct Rejected {
    pub reason: RejectReason,
}

#[derive(Debug)]
pub struct LoginAttempt<S> {
    state: S,
}

impl Default for LoginAttempt<Unauthenticated> {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginAttempt<Unauthenticated> {
    pub fn new() -> Self {
        Self {
            state: Unauthenticated,
        }
    }

    pub fn receive(
        self,
        public_key: impl Into<String>,
        signature: impl Into<Vec<u8>>,
    ) -> LoginAttempt<SignatureReceived> {
        LoginAttempt {
            state: SignatureReceived {
                public_key: public_key.into(),
                signature: signature.into(),
            },
        }
    }
}

impl LoginAttempt<SignatureReceived> {
    pub fn claimed_key(&self) -> &str {
        &self.state.public_key
    }

    pub fn verify(
        self,
        challenge: &Challenge,
    ) -> Result<LoginAttempt<Verified>, LoginAttempt<Rejected>> {
        match verify_challenge(challenge, &self.state.public_key, &self.state.signature) {
            Ok(public_key) => Ok(LoginAttempt {
                state: Verified { public_key },
            }),
            Err(reason) => Err(LoginAttempt {
                state: Rejected { reason },
            }),
        }
    }
}

impl LoginAttempt<Verified> {
    pub fn public_key(&self) -> &PublicKey {
        &self.state.public_key
    }

    /// Finish the attempt with the stored wallet and its new session.
    pub fn issue(
        self,
        wallet: WalletRecord,
        session: IssuedSession,
        registered: bool,
    ) -> LoginAttempt<SessionIssued> {
        debug_assert_eq!(wallet.public_key, self.state.public_key);
        LoginAttempt {
            state: SessionIssued {
                identity: wallet.identity(),
                session,
                registered,
            },
        }
    }
}

impl LoginAttempt<SessionIssued> {
    pub fn into_inner(self) -> SessionIssued {
        self.state
    }
}

impl LoginAttempt<Rejected> {
    pub fn reason(&self) -> &RejectReason {
        &self.state.reason
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::SecretKey;

    #[test]
    fn test_valid_signature_verifies() {
        let wallet = SecretKey::generate().unwrap();
        let challenge = Challenge::default();
        let signature = wallet.sign(challenge.as_bytes());

        let attempt = LoginAttempt::new()
            .receive(wallet.public().to_string(), signature.to_bytes())
            .verify(&challenge)
            .unwrap();
        assert_eq!(attempt.public_key(), &wallet.public());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let wallet = SecretKey::generate().unwrap();
        let challenge = Challenge::default();
        let mut signature = wallet.sign(challenge.as_bytes()).to_bytes();
        signature[10] ^= 0xff;

        let rejected = LoginAttempt::new()
            .receive(wallet.public().to_string(), signature)
            .verify(&challenge)
            .unwrap_err();
        assert_eq!(rejected.reason(), &RejectReason::SignatureMismatch);
    }

    #[test]
    fn test_other_challenge_rejected() {
        let wallet = SecretKey::generate().unwrap();
        let signature = wallet.sign(b"some other message");

        let result = verify_challenge(
            &Challenge::default(),
            &wallet.public().to_string(),
            &signature.to_bytes(),
        );
        assert_eq!(result, Err(RejectReason::SignatureMismatch));
    }

    #[test]
    fn test_malformed_inputs_rejected() {
        let wallet = SecretKey::generate().unwrap();
        let challenge = Challenge::default();
        let signature = wallet.sign(challenge.as_bytes()).to_bytes();

        assert!(matches!(
            verify_challenge(&challenge, "definitely not base58 0OIl", &signature),
            Err(RejectReason::MalformedPublicKey(_))
        ));
        assert_eq!(
            verify_challenge(&challenge, &wallet.public().to_string(), &signature[..63]),
            Err(RejectReason::MalformedSignature(63))
        );
    }
}
