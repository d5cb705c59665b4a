use crate::crypto::Challenge;

use super::handshake::{LoginAttempt, SessionIssued};
use super::identity::{IdentityStore, WalletIdentity};
use super::session::{SessionError, SessionIssuer};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Runs the login handshake and checks session credentials.
#[derive(Debug, Clone)]
pub struct Authenticator<S> {
    store: S,
    issuer: SessionIssuer,
    challenge: Challenge,
}

impl<S: IdentityStore> Authenticator<S> {
    pub fn new(store: S, issuer: SessionIssuer, challenge: Challenge) -> Self {
        Self {
            store,
            issuer,
            challenge,
        }
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    pub fn issuer(&self) -> &SessionIssuer {
        &self.issuer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Verify a challenge signature, registering the wallet on first sight,
    /// and issue a session for it.
    pub async fn authenticate(
        &self,
        public_key: &str,
        signature: &[u8],
    ) -> Result<SessionIssued, AuthError> {
        let attempt = LoginAttempt::new().receive(public_key, signature);
        let verified = match attempt.verify(&self.challenge) {
            Ok(verified) => verified,
            Err(rejected) => {
                tracing::info!(public_key, reason = %rejected.reason(), "login rejected");
                return Err(AuthError::InvalidSignature);
            }
        };

        let (wallet, registered) = self
            .store
            .ensure_wallet(verified.public_key())
            .await
            .map_err(|e| {
                tracing::error!(public_key, "identity store failure: {}", e);
                AuthError::Internal(e.to_string())
            })?;
        if registered {
            tracing::info!(public_key, "registered new wallet");
        }

        let session = self.issuer.issue(&wallet.identity()).map_err(|e| {
            tracing::error!("failed to issue session: {}", e);
            AuthError::Internal(e.to_string())
        })?;

        Ok(verified.issue(wallet, session, registered).into_inner())
    }

    /// Resolve the wallet behind a bearer credential.
    pub fn authorize(&self, credential: Option<&str>) -> Result<WalletIdentity, AuthError> {
        let credential = credential
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        self.issuer.verify(credential).map_err(|e| {
            match e {
                SessionError::Expired => tracing::debug!("expired session credential"),
                e => tracing::debug!("rejected session credential: {}", e),
            }
            AuthError::Unauthenticated
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::session::{SessionSecret, DEFAULT_SESSION_TTL};
    use crate::crypto::SecretKey;
    use crate::testkit::MemoryVault;
    use time::{Duration, OffsetDateTime};

    fn authenticator(vault: MemoryVault) -> Authenticator<MemoryVault> {
        let issuer = SessionIssuer::new(&SessionSecret::generate().unwrap(), DEFAULT_SESSION_TTL);
        Authenticator::new(vault, issuer, Challenge::default())
    }

    #[tokio::test]
    async fn test_first_login_registers_wallet() {
        let vault = MemoryVault::default();
        let auth = authenticator(vault.clone());
        let wallet = SecretKey::generate().unwrap();
        let signature = wallet.sign(auth.challenge().as_bytes()).to_bytes();

        let first = auth
            .authenticate(&wallet.public().to_string(), &signature)
            .await
            .unwrap();
        assert!(first.registered);
        assert_eq!(first.identity.public_key(), &wallet.public());

        let second = auth
            .authenticate(&wallet.public().to_string(), &signature)
            .await
            .unwrap();
        assert!(!second.registered);
        assert_eq!(vault.wallet_count(), 1);

        let identity = auth
            .authorize(Some(second.session.credential.as_str()))
            .unwrap();
        assert_eq!(identity, first.identity);
    }

    #[tokio::test]
    async fn test_bad_signature_creates_nothing() {
        let vault = MemoryVault::default();
        let auth = authenticator(vault.clone());
        let wallet = SecretKey::generate().unwrap();
        let mut signature = wallet.sign(auth.challenge().as_bytes()).to_bytes();
        signature[0] ^= 0x01;

        let result = auth
            .authenticate(&wallet.public().to_string(), &signature)
            .await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
        assert_eq!(vault.wallet_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let vault = MemoryVault::default();
        vault.fail_requests(true);
        let auth = authenticator(vault);
        let wallet = SecretKey::generate().unwrap();
        let signature = wallet.sign(auth.challenge().as_bytes()).to_bytes();

        let result = auth
            .authenticate(&wallet.public().to_string(), &signature)
            .await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn test_authorize_rejects_missing_and_expired() {
        let auth = authenticator(MemoryVault::default());
        assert!(matches!(auth.authorize(None), Err(AuthError::Unauthenticated)));
        assert!(matches!(
            auth.authorize(Some("")),
            Err(AuthError::Unauthenticated)
        ));

        let identity = WalletIdentity::new(SecretKey::generate().unwrap().public());
        let stale = auth
            .issuer()
            .issue_at(&identity, OffsetDateTime::now_utc() - Duration::hours(2))
            .unwrap();
        assert!(matches!(
            auth.authorize(Some(stale.credential.as_str())),
            Err(AuthError::Unauthenticated)
        ));
    }
}
