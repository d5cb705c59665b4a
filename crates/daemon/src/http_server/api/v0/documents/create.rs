use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::document::{
    DocumentDraft, DocumentRecord, DocumentStore, DocumentStoreError, NewDocument,
    ValidationError,
};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::api::message_response;
use crate::http_server::api::session::AuthenticatedWallet;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    /// Base64 ciphertext of the content identifier
    #[serde(rename = "encryptedCID", default)]
    pub encrypted_cid: Option<String>,
    /// Base64 nonce the ciphertext was sealed with
    #[serde(default)]
    pub iv: Option<String>,
    /// Digest of the plaintext file, as a byte array
    #[serde(rename = "fileHash", default)]
    pub file_hash: Option<Vec<u8>>,
    #[serde(rename = "fileType", default)]
    pub file_type: Option<String>,
    #[serde(rename = "customFileName", default)]
    pub custom_file_name: Option<String>,
}

impl From<NewDocument> for CreateDocumentRequest {
    fn from(document: NewDocument) -> Self {
        Self {
            encrypted_cid: Some(document.envelope.encrypted_cid),
            iv: Some(document.envelope.iv),
            file_hash: Some(document.content_hash.as_bytes().to_vec()),
            file_type: Some(document.mime_type),
            custom_file_name: Some(document.name),
        }
    }
}

impl From<CreateDocumentRequest> for DocumentDraft {
    fn from(req: CreateDocumentRequest) -> Self {
        DocumentDraft {
            encrypted_cid: req.encrypted_cid,
            iv: req.iv,
            file_hash: req.file_hash,
            mime_type: req.file_type,
            name: req.custom_file_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentResponse {
    pub message: String,
    pub document: DocumentRecord,
}

pub async fn handler(
    State(state): State<ServiceState>,
    AuthenticatedWallet(owner): AuthenticatedWallet,
    body: Result<Json<CreateDocumentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CreateDocumentError> {
    let Json(req) = body.map_err(|e| CreateDocumentError::Body(e.body_text()))?;
    let document = DocumentDraft::from(req).validate()?;

    let record = state
        .database()
        .create_document(&owner, document)
        .await
        .map_err(|e| match e {
            DocumentStoreError::UnknownOwner(_) => CreateDocumentError::UnknownOwner,
            e => CreateDocumentError::Database(e.to_string()),
        })?;

    tracing::info!(
        wallet = %owner,
        document_id = %record.id,
        "document stored"
    );
    Ok((
        StatusCode::OK,
        Json(CreateDocumentResponse {
            message: "Document uploaded successfully".to_string(),
            document: record,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateDocumentError {
    #[error("invalid request body: {0}")]
    Body(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("owner has no wallet record")]
    UnknownOwner,
    #[error("database error: {0}")]
    Database(String),
}

impl IntoResponse for CreateDocumentError {
    fn into_response(self) -> Response {
        match self {
            CreateDocumentError::Body(msg) => {
                message_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", msg))
            }
            CreateDocumentError::Validation(e) => {
                message_response(StatusCode::BAD_REQUEST, e.to_string())
            }
            // A valid credential for a wallet this database has never seen
            CreateDocumentError::UnknownOwner => {
                message_response(StatusCode::UNAUTHORIZED, "Invalid or expired session")
            }
            CreateDocumentError::Database(e) => {
                tracing::error!("CREATE DOCUMENT ERROR: {}", e);
                message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for CreateDocumentRequest {
    type Response = CreateDocumentResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/documents")?;
        Ok(client.post(full_url).json(&self))
    }
}
