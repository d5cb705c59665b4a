use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;

use common::content_store::{ContentStore, ContentStoreError};
use common::crypto::{DerivedKey, Envelope, EnvelopeError, KeyDerivationError};
use common::document::{ContentHash, NewDocument, ValidationError};
use docvault_daemon::http_server::api::client::ApiError;
use docvault_daemon::http_server::api::v0::documents::CreateDocumentRequest;
use docvault_daemon::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// File to encrypt-address and upload
    pub file: PathBuf,

    /// Display name (defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,

    /// MIME type (guessed from the extension if not set)
    #[arg(long)]
    pub mime: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("no file name for {0}, pass --name")]
    NoName(PathBuf),
    #[error("content store error: {0}")]
    ContentStore(#[from] ContentStoreError),
    #[error("key derivation failed: {0}")]
    KeyDerivation(#[from] KeyDerivationError),
    #[error("encryption failed: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("invalid document: {0}")]
    Validation(#[from] ValidationError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl Upload {
    fn display_name(&self) -> Result<String, UploadError> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::NoName(self.file.clone()))
    }

    fn mime_type(&self) -> String {
        self.mime.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.file)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let client = ctx.session_client(&state)?;
        let wallet = state.load_wallet()?;

        let data = tokio::fs::read(&self.file)
            .await
            .map_err(|e| UploadError::Read(self.file.clone(), e))?;
        let content_hash = ContentHash::sha256(&data);

        let cid = ctx.content_store(&state).put(Bytes::from(data)).await?;
        tracing::debug!(%cid, "content added");

        let key = DerivedKey::derive(&wallet, &state.config.challenge())?;
        let envelope = Envelope::seal(&cid.to_string(), &key)?.encode();

        let document = NewDocument::new(envelope, self.display_name()?, self.mime_type(), content_hash)?;
        let response = client.call(CreateDocumentRequest::from(document)).await?;

        Ok(format!(
            "{}\n  id:   {}\n  name: {}\n  type: {}\n  hash: {}",
            response.message,
            response.document.id,
            response.document.name,
            response.document.mime_type,
            response.document.file_hash,
        ))
    }
}
