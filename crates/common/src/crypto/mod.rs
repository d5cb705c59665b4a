//! Cryptographic primitives for DocVault
//!
//! - **Identity**: Ed25519 wallet keypairs, public keys as base58 strings
//! - **Key derivation**: `SHA-256(signature over the challenge)` as an AES-256-GCM key
//! - **Envelopes**: content identifiers sealed with AES-256-GCM and a random 96-bit nonce
//!
//! # Security Model
//!
//! The same challenge signature that logs a wallet in also yields its document
//! key, so the key is only as secret as that signature. The server only ever
//! sees the signature during login and never sees plaintext content
//! identifiers.

mod challenge;
mod derived_key;
mod envelope;
mod keys;
mod signer;

pub use challenge::{Challenge, DEFAULT_CHALLENGE};
pub use derived_key::{DerivedKey, KeyDerivationError, DERIVED_KEY_SIZE};
pub use ed25519_dalek::Signature;
pub use envelope::{DecryptionError, EncodedEnvelope, Envelope, EnvelopeError, NONCE_SIZE};
pub use keys::{KeyError, PublicKey, SecretKey, PUBLIC_KEY_SIZE, SIGNATURE_SIZE};
pub use signer::{MessageSigner, SignerError, WatchOnly};
