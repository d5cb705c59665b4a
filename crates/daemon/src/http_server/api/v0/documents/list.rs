use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::document::{DocumentRecord, DocumentStore, DocumentStoreError};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::api::message_response;
use crate::http_server::api::session::AuthenticatedWallet;
use crate::ServiceState;

/// Body message of the 404 for an owner with no documents
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents found";

/// Lists the caller's documents. The owner comes from the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDocumentsRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDocumentsResponse {
    pub message: String,
    /// Oldest first
    pub documents: Vec<DocumentRecord>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    AuthenticatedWallet(owner): AuthenticatedWallet,
) -> Result<impl IntoResponse, ListDocumentsError> {
    let documents = state
        .database()
        .list_documents(&owner)
        .await
        .map_err(|e| match e {
            DocumentStoreError::UnknownOwner(_) => ListDocumentsError::UnknownOwner,
            e => ListDocumentsError::Database(e.to_string()),
        })?;

    if documents.is_empty() {
        return Err(ListDocumentsError::NoDocuments);
    }

    Ok((
        StatusCode::OK,
        Json(ListDocumentsResponse {
            message: "Documents retrieved successfully".to_string(),
            documents,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListDocumentsError {
    #[error("no documents found")]
    NoDocuments,
    #[error("owner has no wallet record")]
    UnknownOwner,
    #[error("database error: {0}")]
    Database(String),
}

impl IntoResponse for ListDocumentsError {
    fn into_response(self) -> Response {
        match self {
            ListDocumentsError::NoDocuments => {
                message_response(StatusCode::NOT_FOUND, NO_DOCUMENTS_MESSAGE)
            }
            ListDocumentsError::UnknownOwner => {
                message_response(StatusCode::UNAUTHORIZED, "Invalid or expired session")
            }
            ListDocumentsError::Database(e) => {
                tracing::error!("LIST DOCUMENTS ERROR: {}", e);
                message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListDocumentsRequest {
    type Response = ListDocumentsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/documents")?;
        Ok(client.get(full_url))
    }
}
