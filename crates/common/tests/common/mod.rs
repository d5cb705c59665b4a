//! Shared test utilities for vault integration tests
#![allow(dead_code)]

use common::auth::{Authenticator, SessionIssuer, SessionSecret, DEFAULT_SESSION_TTL};
use common::crypto::{Challenge, SecretKey};
use common::testkit::MemoryVault;

/// A fresh vault and an authenticator backed by it
pub fn setup_vault() -> (MemoryVault, Authenticator<MemoryVault>) {
    let vault = MemoryVault::new();
    let issuer = SessionIssuer::new(&SessionSecret::generate().unwrap(), DEFAULT_SESSION_TTL);
    let authenticator = Authenticator::new(vault.clone(), issuer, Challenge::default());
    (vault, authenticator)
}

/// A new wallet and its signature over `challenge`
pub fn signed_wallet(challenge: &Challenge) -> (SecretKey, Vec<u8>) {
    let wallet = SecretKey::generate().unwrap();
    let signature = wallet.sign(challenge.as_bytes()).to_bytes().to_vec();
    (wallet, signature)
}
