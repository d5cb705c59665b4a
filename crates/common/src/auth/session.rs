//! Session credentials
//!
//! A session is an HS256 JWT whose subject is the wallet's base58 public key.
//! It carries an expiry and nothing else. Tokens are checked with zero leeway
//! so a credential is refused as soon as its expiry passes.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::identity::WalletIdentity;
use crate::crypto::PublicKey;

/// Size of the HMAC secret used to sign session tokens
pub const SESSION_SECRET_SIZE: usize = 32;
/// Default session lifetime (one hour)
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(1);
/// Longest session lifetime a configuration may ask for
pub const MAX_SESSION_TTL: Duration = Duration::days(30);

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session token has expired")]
    Expired,
    #[error("invalid session token: {0}")]
    Invalid(String),
    #[error("failed to sign session token: {0}")]
    Signing(String),
    #[error("invalid session secret: {0}")]
    Secret(String),
    #[error("invalid session lifetime: {0}")]
    Lifetime(String),
}

/// Session lifetime from a configured number of seconds.
///
/// Zero and anything above `MAX_SESSION_TTL` are refused.
pub fn session_ttl_from_secs(secs: u64) -> Result<Duration, SessionError> {
    let seconds = i64::try_from(secs)
        .map_err(|_| SessionError::Lifetime(format!("{} seconds is out of range", secs)))?;
    let ttl = Duration::seconds(seconds);
    if ttl <= Duration::ZERO || ttl > MAX_SESSION_TTL {
        return Err(SessionError::Lifetime(format!(
            "{} seconds is not between 1 and {}",
            secs,
            MAX_SESSION_TTL.whole_seconds()
        )));
    }
    Ok(ttl)
}

/// Server-side secret for signing session tokens.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionSecret([u8; SESSION_SECRET_SIZE]);

impl SessionSecret {
    pub fn generate() -> Result<Self, SessionError> {
        let mut bytes = [0u8; SESSION_SECRET_SIZE];
        getrandom::getrandom(&mut bytes).map_err(|e| SessionError::Secret(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, SessionError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|e| SessionError::Secret(e.to_string()))?;
        let bytes: [u8; SESSION_SECRET_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
            SessionError::Secret(format!(
                "expected {} bytes, got {}",
                SESSION_SECRET_SIZE,
                b.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; SESSION_SECRET_SIZE]> for SessionSecret {
    fn from(bytes: [u8; SESSION_SECRET_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(..)")
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Base58 wallet public key
    pub sub: String,
    /// Expiry as a unix timestamp in seconds
    pub exp: i64,
}

/// Opaque bearer credential handed to the client after login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(..)")
    }
}

/// A freshly issued credential and when it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub credential: SessionCredential,
    pub expires_at: OffsetDateTime,
}

/// Signs and checks session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionIssuer {
    pub fn new(secret: &SessionSecret, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &WalletIdentity) -> Result<IssuedSession, SessionError> {
        self.issue_at(identity, OffsetDateTime::now_utc())
    }

    /// Issue a credential as if the current time were `now`.
    pub fn issue_at(
        &self,
        identity: &WalletIdentity,
        now: OffsetDateTime,
    ) -> Result<IssuedSession, SessionError> {
        let expires_at = now
            .checked_add(self.ttl)
            .ok_or_else(|| SessionError::Signing("session expiry out of range".to_string()))?;
        let claims = SessionClaims {
            sub: identity.public_key().to_base58(),
            exp: expires_at.unix_timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))?;

        Ok(IssuedSession {
            credential: SessionCredential(token),
            expires_at,
        })
    }

    /// Check signature and expiry, returning the wallet the token was issued to.
    pub fn verify(&self, credential: &str) -> Result<WalletIdentity, SessionError> {
        use jsonwebtoken::errors::ErrorKind;

        let data = jsonwebtoken::decode::<SessionClaims>(credential, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid(e.to_string()),
            })?;

        let public_key: PublicKey = data
            .claims
            .sub
            .parse()
            .map_err(|e| SessionError::Invalid(format!("subject: {}", e)))?;
        Ok(WalletIdentity::new(public_key))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::SecretKey;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(&SessionSecret::generate().unwrap(), DEFAULT_SESSION_TTL)
    }

    fn identity() -> WalletIdentity {
        WalletIdentity::new(SecretKey::generate().unwrap().public())
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let identity = identity();

        let session = issuer.issue(&identity).unwrap();
        assert_eq!(issuer.verify(session.credential.as_str()).unwrap(), identity);
    }

    #[test]
    fn test_expiry_is_one_hour() {
        let issuer = issuer();
        let now = OffsetDateTime::now_utc();
        let session = issuer.issue_at(&identity(), now).unwrap();
        assert_eq!(session.expires_at - now, Duration::hours(1));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let issued_at = OffsetDateTime::now_utc() - Duration::hours(1) - Duration::seconds(5);
        let session = issuer.issue_at(&identity(), issued_at).unwrap();

        assert!(matches!(
            issuer.verify(session.credential.as_str()),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let session = issuer().issue(&identity()).unwrap();
        assert!(matches!(
            issuer().verify(session.credential.as_str()),
            Err(SessionError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            issuer().verify("not.a.token"),
            Err(SessionError::Invalid(_))
        ));
        assert!(matches!(issuer().verify(""), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        let issuer = SessionIssuer::new(
            &SessionSecret::generate().unwrap(),
            Duration::seconds(i64::MAX),
        );
        assert!(matches!(
            issuer.issue(&identity()),
            Err(SessionError::Signing(_))
        ));
    }

    #[test]
    fn test_ttl_bounds() {
        assert_eq!(session_ttl_from_secs(3600).unwrap(), Duration::hours(1));
        assert_eq!(
            session_ttl_from_secs(MAX_SESSION_TTL.whole_seconds() as u64).unwrap(),
            MAX_SESSION_TTL
        );
        assert!(matches!(session_ttl_from_secs(0), Err(SessionError::Lifetime(_))));
        assert!(matches!(
            session_ttl_from_secs(1_000_000_000_000),
            Err(SessionError::Lifetime(_))
        ));
        assert!(matches!(
            session_ttl_from_secs(u64::MAX),
            Err(SessionError::Lifetime(_))
        ));
    }

    #[test]
    fn test_secret_hex_round_trip() {
        let secret = SessionSecret::generate().unwrap();
        let recovered = SessionSecret::from_hex(&secret.to_hex()).unwrap();
        assert_eq!(secret.as_bytes(), recovered.as_bytes());
        assert!(SessionSecret::from_hex("abcd").is_err());
    }
}
