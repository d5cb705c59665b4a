use std::fmt::{Debug, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::crypto::PublicKey;

/// An authenticated wallet, as seen by request handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletIdentity(PublicKey);

impl WalletIdentity {
    pub fn new(public_key: PublicKey) -> Self {
        Self(public_key)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.0
    }
}

impl Display for WalletIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// A registered wallet as persisted by an `IdentityStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRecord {
    pub public_key: PublicKey,
    pub created_at: OffsetDateTime,
}

impl WalletRecord {
    pub fn identity(&self) -> WalletIdentity {
        WalletIdentity(self.public_key)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityStoreError<T> {
    #[error("unhandled identity store error: {0}")]
    Provider(#[from] T),
    /// The wallet is already registered. Stores must report this from
    ///  `insert_wallet` when the public key uniqueness guard trips.
    #[error("wallet already registered")]
    Conflict,
    /// A conflicting insert was reported but the row is not readable
    #[error("wallet {0} vanished after insert conflict")]
    Vanished(PublicKey),
}

/// Persistence contract for wallet identities.
#[async_trait]
pub trait IdentityStore: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send;

    async fn find_wallet(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<WalletRecord>, IdentityStoreError<Self::Error>>;

    /// Register a wallet. Must fail with `IdentityStoreError::Conflict`
    ///  rather than overwrite when the key already exists.
    async fn insert_wallet(
        &self,
        public_key: &PublicKey,
    ) -> Result<WalletRecord, IdentityStoreError<Self::Error>>;

    /// Find a wallet or register it on first sight.
    ///
    /// Two requests for the same new wallet may both miss the lookup; the one
    /// that loses the insert re-reads the winner's row. Returns the record
    /// and whether this call created it.
    async fn ensure_wallet(
        &self,
        public_key: &PublicKey,
    ) -> Result<(WalletRecord, bool), IdentityStoreError<Self::Error>> {
        if let Some(existing) = self.find_wallet(public_key).await? {
            return Ok((existing, false));
        }

        match self.insert_wallet(public_key).await {
            Ok(created) => Ok((created, true)),
            Err(IdentityStoreError::Conflict) => {
                tracing::debug!(%public_key, "lost wallet registration race, re-reading");
                let existing = self
                    .find_wallet(public_key)
                    .await?
                    .ok_or(IdentityStoreError::Vanished(*public_key))?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }
}
