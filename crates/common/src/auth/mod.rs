//! Wallet authentication
//!
//! A wallet logs in by signing the process-wide challenge. The server checks
//! the detached signature against the claimed public key, registers the
//! wallet the first time it is seen, and hands back a short-lived session
//! credential that authorizes later requests.

mod authenticator;
mod handshake;
mod identity;
mod session;

pub use authenticator::{AuthError, Authenticator};
pub use handshake::{
    verify_challenge, LoginAttempt, RejectReason, Rejected, SessionIssued, SignatureReceived,
    Unauthenticated, Verified,
};
pub use identity::{IdentityStore, IdentityStoreError, WalletIdentity, WalletRecord};
pub use session::{
    session_ttl_from_secs, IssuedSession, SessionClaims, SessionCredential, SessionError,
    SessionIssuer, SessionSecret, DEFAULT_SESSION_TTL, MAX_SESSION_TTL, SESSION_SECRET_SIZE,
};
