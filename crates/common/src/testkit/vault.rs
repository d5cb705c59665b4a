use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

use crate::auth::{IdentityStore, IdentityStoreError, WalletIdentity, WalletRecord};
use crate::crypto::PublicKey;
use crate::document::{DocumentRecord, DocumentStore, DocumentStoreError, NewDocument};

/// In-memory wallet and document store
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    inner: Arc<RwLock<MemoryVaultInner>>,
    failing: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct MemoryVaultInner {
    wallets: HashMap<PublicKey, WalletRecord>,
    /// Insertion order doubles as creation order
    documents: Vec<DocumentRecord>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryVaultError {
    #[error("memory vault error: {0}")]
    Internal(String),
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `MemoryVaultError::Internal`.
    pub fn fail_requests(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn wallet_count(&self) -> usize {
        self.inner.read().map(|i| i.wallets.len()).unwrap_or(0)
    }

    pub fn document_count(&self) -> usize {
        self.inner.read().map(|i| i.documents.len()).unwrap_or(0)
    }

    fn check(&self) -> Result<(), MemoryVaultError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MemoryVaultError::Internal("injected failure".into()));
        }
        Ok(())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, MemoryVaultInner>, MemoryVaultError> {
        self.check()?;
        self.inner.read().map_err(|e| {
            MemoryVaultError::Internal(format!("failed to acquire read lock: {}", e))
        })
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, MemoryVaultInner>, MemoryVaultError> {
        self.check()?;
        self.inner.write().map_err(|e| {
            MemoryVaultError::Internal(format!("failed to acquire write lock: {}", e))
        })
    }
}

#[async_trait]
impl IdentityStore for MemoryVault {
    type Error = MemoryVaultError;

    async fn find_wallet(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<WalletRecord>, IdentityStoreError<Self::Error>> {
        Ok(self.read()?.wallets.get(public_key).cloned())
    }

    async fn insert_wallet(
        &self,
        public_key: &PublicKey,
    ) -> Result<WalletRecord, IdentityStoreError<Self::Error>> {
        let mut inner = self.write()?;
        if inner.wallets.contains_key(public_key) {
            return Err(IdentityStoreError::Conflict);
        }

        let record = WalletRecord {
            public_key: *public_key,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.wallets.insert(*public_key, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl DocumentStore for MemoryVault {
    type Error = MemoryVaultError;

    async fn create_document(
        &self,
        owner: &WalletIdentity,
        document: NewDocument,
    ) -> Result<DocumentRecord, DocumentStoreError<Self::Error>> {
        let mut inner = self.write()?;
        if !inner.wallets.contains_key(owner.public_key()) {
            return Err(DocumentStoreError::UnknownOwner(*owner.public_key()));
        }

        let record = DocumentRecord::create(owner, document);
        inner.documents.push(record.clone());
        Ok(record)
    }

    async fn list_documents(
        &self,
        owner: &WalletIdentity,
    ) -> Result<Vec<DocumentRecord>, DocumentStoreError<Self::Error>> {
        let inner = self.read()?;
        if !inner.wallets.contains_key(owner.public_key()) {
            return Err(DocumentStoreError::UnknownOwner(*owner.public_key()));
        }

        Ok(inner
            .documents
            .iter()
            .filter(|d| &d.owner == owner.public_key())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::SecretKey;
    use crate::testkit::sample_document as document;

    #[tokio::test]
    async fn test_insert_conflict() {
        let vault = MemoryVault::new();
        let key = SecretKey::generate().unwrap().public();

        vault.insert_wallet(&key).await.unwrap();
        assert!(matches!(
            vault.insert_wallet(&key).await,
            Err(IdentityStoreError::Conflict)
        ));

        let (record, created) = vault.ensure_wallet(&key).await.unwrap();
        assert!(!created);
        assert_eq!(record.public_key, key);
    }

    #[tokio::test]
    async fn test_documents_scoped_to_owner() {
        let vault = MemoryVault::new();
        let alice = WalletIdentity::new(SecretKey::generate().unwrap().public());
        let bob = WalletIdentity::new(SecretKey::generate().unwrap().public());
        vault.ensure_wallet(alice.public_key()).await.unwrap();
        vault.ensure_wallet(bob.public_key()).await.unwrap();

        vault.create_document(&alice, document("a1")).await.unwrap();
        vault.create_document(&bob, document("b1")).await.unwrap();
        vault.create_document(&alice, document("a2")).await.unwrap();

        let names: Vec<_> = vault
            .list_documents(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn test_unknown_owner() {
        let vault = MemoryVault::new();
        let stranger = WalletIdentity::new(SecretKey::generate().unwrap().public());
        assert!(matches!(
            vault.create_document(&stranger, document("x")).await,
            Err(DocumentStoreError::UnknownOwner(_))
        ));
        assert!(matches!(
            vault.list_documents(&stranger).await,
            Err(DocumentStoreError::UnknownOwner(_))
        ));
        assert_eq!(vault.document_count(), 0);
    }
}
