/**
 * Wallet login: challenge verification,
 *  implicit registration and session credentials.
 */
pub mod auth;
/**
 * Contract for the external content-addressed
 *  store documents live in.
 */
pub mod content_store;
/**
 * Cryptographic types and operations.
 *  - Wallet key implementations
 *  - Signature-derived keys and CID envelopes
 */
pub mod crypto;
/**
 * Document records and the contract
 *  for persisting them.
 */
pub mod document;
pub mod loadable;
/**
 * In-memory stores for tests.
 */
pub mod testkit;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::auth::{AuthError, Authenticator, SessionCredential, WalletIdentity};
    pub use crate::content_store::{ContentStore, ContentStoreError};
    pub use crate::crypto::{
        Challenge, DerivedKey, EncodedEnvelope, Envelope, PublicKey, SecretKey,
    };
    pub use crate::document::{ContentHash, DocumentRecord, NewDocument};
    pub use crate::loadable::Loadable;
    pub use crate::version::build_info;
    pub use cid::Cid;
}
