//! Document records
//!
//! A record ties an owner to an encrypted content identifier and a little
//! plaintext metadata. Records are written once and never updated.

use std::fmt::{self, Debug, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::WalletIdentity;
use crate::crypto::{EncodedEnvelope, PublicKey};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Digest of a document's plaintext bytes, rendered as lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(Vec<u8>);

impl ContentHash {
    /// SHA-256 of `data`.
    pub fn sha256(data: &[u8]) -> Self {
        Self(Sha256::digest(data).to_vec())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::MissingFields(vec!["fileHash"]));
        }
        Ok(Self(bytes))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, ValidationError> {
        let bytes = hex::decode(hex_str).map_err(|e| ValidationError::Invalid {
            field: "fileHash",
            reason: e.to_string(),
        })?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentHash").field(&self.to_hex()).finish()
    }
}

/// Standard base64 alphabet plus padding.
///
/// Envelope parts are opaque to the server. It only rejects text that could
/// never be base64; whether it decodes to a usable envelope is for the owner
/// to find out.
fn check_base64_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingFields(vec![field]));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')))
    {
        return Err(ValidationError::Invalid {
            field,
            reason: format!("unexpected character {:?}", bad),
        });
    }
    Ok(())
}

/// A validated document ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub envelope: EncodedEnvelope,
    pub name: String,
    pub mime_type: String,
    pub content_hash: ContentHash,
}

impl NewDocument {
    pub fn new(
        envelope: EncodedEnvelope,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        content_hash: ContentHash,
    ) -> Result<Self, ValidationError> {
        DocumentDraft {
            encrypted_cid: Some(envelope.encrypted_cid),
            iv: Some(envelope.iv),
            file_hash: Some(content_hash.0),
            mime_type: Some(mime_type.into()),
            name: Some(name.into()),
        }
        .validate()
    }
}

/// Document fields as received, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentDraft {
    pub encrypted_cid: Option<String>,
    pub iv: Option<String>,
    pub file_hash: Option<Vec<u8>>,
    pub mime_type: Option<String>,
    pub name: Option<String>,
}

impl DocumentDraft {
    pub fn validate(self) -> Result<NewDocument, ValidationError> {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let encrypted_cid = present(self.encrypted_cid);
        let iv = present(self.iv);
        let file_hash = self.file_hash.filter(|h| !h.is_empty());
        let mime_type = present(self.mime_type);
        let name = present(self.name);

        let mut missing = Vec::new();
        if encrypted_cid.is_none() {
            missing.push("encryptedCID");
        }
        if iv.is_none() {
            missing.push("iv");
        }
        if file_hash.is_none() {
            missing.push("fileHash");
        }
        if mime_type.is_none() {
            missing.push("fileType");
        }
        if name.is_none() {
            missing.push("customFileName");
        }

        match (encrypted_cid, iv, file_hash, mime_type, name) {
            (Some(encrypted_cid), Some(iv), Some(file_hash), Some(mime_type), Some(name)) => {
                check_base64_text("encryptedCID", &encrypted_cid)?;
                check_base64_text("iv", &iv)?;
                Ok(NewDocument {
                    envelope: EncodedEnvelope { encrypted_cid, iv },
                    name,
                    mime_type,
                    content_hash: ContentHash::from_bytes(file_hash)?,
                })
            }
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }
}

/// A stored document, in the JSON shape clients see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(rename = "encryptedcid")]
    pub encrypted_cid: String,
    pub iv: String,
    /// Lowercase hex
    #[serde(rename = "fileHash")]
    pub file_hash: String,
    #[serde(rename = "publicKey")]
    pub owner: PublicKey,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl DocumentRecord {
    /// Build the record for a new document owned by `owner`.
    pub fn create(owner: &WalletIdentity, document: NewDocument) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: document.name,
            mime_type: document.mime_type,
            encrypted_cid: document.envelope.encrypted_cid,
            iv: document.envelope.iv,
            file_hash: document.content_hash.to_hex(),
            owner: *owner.public_key(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn envelope(&self) -> EncodedEnvelope {
        EncodedEnvelope {
            encrypted_cid: self.encrypted_cid.clone(),
            iv: self.iv.clone(),
        }
    }

    pub fn content_hash(&self) -> Result<ContentHash, ValidationError> {
        ContentHash::from_hex(&self.file_hash)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError<T> {
    #[error("unhandled document store error: {0}")]
    Provider(#[from] T),
    /// The owner has no wallet record
    #[error("unknown owner {0}")]
    UnknownOwner(PublicKey),
}

/// Persistence contract for document records.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send;

    async fn create_document(
        &self,
        owner: &WalletIdentity,
        document: NewDocument,
    ) -> Result<DocumentRecord, DocumentStoreError<Self::Error>>;

    /// All records owned by `owner`, oldest first.
    ///
    /// A registered owner with no records gets an empty list. An owner with
    /// no wallet record gets `DocumentStoreError::UnknownOwner`.
    async fn list_documents(
        &self,
        owner: &WalletIdentity,
    ) -> Result<Vec<DocumentRecord>, DocumentStoreError<Self::Error>>;
}
