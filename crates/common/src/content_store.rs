//! Content-addressed storage contract
//!
//! Documents live outside the vault in a content-addressed store. The vault
//! only needs `put` and `get`; the store decides what the identifier looks
//! like.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cid::multihash::Multihash;
use cid::Cid;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

/// Multicodec code for raw binary content
pub const RAW_CODEC: u64 = 0x55;
/// Multihash code for sha2-256
pub const SHA2_256_CODE: u64 = 0x12;

#[derive(Debug, thiserror::Error)]
pub enum ContentStoreError {
    #[error("content not found: {0}")]
    NotFound(Cid),
    #[error("invalid content identifier: {0}")]
    InvalidCid(String),
    #[error("content store error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ContentStore: Send + Sync + Debug {
    /// Store `data`, returning its content identifier.
    async fn put(&self, data: Bytes) -> Result<Cid, ContentStoreError>;

    async fn get(&self, cid: &Cid) -> Result<Bytes, ContentStoreError>;
}

/// Parse a content identifier in any of its text forms.
pub fn parse_cid(text: &str) -> Result<Cid, ContentStoreError> {
    text.trim()
        .parse::<Cid>()
        .map_err(|e| ContentStoreError::InvalidCid(format!("{}: {}", text, e)))
}

/// CIDv1 (raw, sha2-256) of `data`.
pub fn raw_cid(data: &[u8]) -> Result<Cid, ContentStoreError> {
    let digest = Sha256::digest(data);
    let hash = Multihash::<64>::wrap(SHA2_256_CODE, &digest)
        .map_err(|e| ContentStoreError::Backend(e.to_string()))?;
    Ok(Cid::new_v1(RAW_CODEC, hash))
}

/// Process-local content store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<RwLock<HashMap<Cid, Bytes>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn put(&self, data: Bytes) -> Result<Cid, ContentStoreError> {
        let cid = raw_cid(&data)?;
        self.blobs.write().insert(cid, data);
        Ok(cid)
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, ContentStoreError> {
        self.blobs
            .read()
            .get(cid)
            .cloned()
            .ok_or(ContentStoreError::NotFound(*cid))
    }
}
