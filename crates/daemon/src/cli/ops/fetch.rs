use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use common::content_store::{parse_cid, ContentStore, ContentStoreError};
use common::crypto::{DecryptionError, DerivedKey, KeyDerivationError};
use common::document::{ContentHash, ValidationError};
use docvault_daemon::http_server::api::client::ApiError;
use docvault_daemon::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Fetch {
    /// Document id, as shown by `list`
    pub id: Uuid,

    /// Where to write the file (defaults to the document name)
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("no document with id {0}")]
    NotFound(Uuid),
    #[error("key derivation failed: {0}")]
    KeyDerivation(#[from] KeyDerivationError),
    #[error("cannot open document: {0}")]
    Decryption(#[from] DecryptionError),
    #[error("content store error: {0}")]
    ContentStore(#[from] ContentStoreError),
    #[error("invalid document: {0}")]
    Validation(#[from] ValidationError),
    #[error("content hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Fetch {
    type Error = FetchError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let client = ctx.session_client(&state)?;
        let wallet = state.load_wallet()?;

        let document = client
            .list_documents()
            .await?
            .into_iter()
            .find(|d| d.id == self.id)
            .ok_or(FetchError::NotFound(self.id))?;

        let key = DerivedKey::derive(&wallet, &state.config.challenge())?;
        let cid = parse_cid(&document.envelope().open(&key)?)?;
        let data = ctx.content_store(&state).get(&cid).await?;

        let expected = document.content_hash()?;
        let actual = ContentHash::sha256(&data);
        if actual != expected {
            return Err(FetchError::HashMismatch {
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            });
        }

        let out = self
            .out
            .clone()
            .unwrap_or_else(|| PathBuf::from(&document.name));
        tokio::fs::write(&out, &data)
            .await
            .map_err(|e| FetchError::Write(out.clone(), e))?;

        Ok(format!(
            "Fetched {} ({} bytes) to {}",
            document.name,
            data.len(),
            out.display()
        ))
    }
}
