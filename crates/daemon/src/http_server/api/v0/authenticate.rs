use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use common::auth::{AuthError, SessionCredential};
use common::crypto::{PublicKey, Signature};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::api::message_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateRequest {
    /// Base58 wallet public key
    #[serde(rename = "publicKey", default)]
    pub public_key: String,
    /// Detached signature over the challenge, as a byte array
    #[serde(default)]
    pub signature: Vec<u8>,
}

impl AuthenticateRequest {
    pub fn new(public_key: &PublicKey, signature: &Signature) -> Self {
        Self {
            public_key: public_key.to_string(),
            signature: signature.to_bytes().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateResponse {
    pub token: SessionCredential,
    #[serde(rename = "expiresAt", with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

pub async fn handler(
    State(state): State<ServiceState>,
    body: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthenticateError> {
    let Json(req) = body.map_err(|e| AuthenticateError::Body(e.body_text()))?;
    let issued = state
        .authenticator()
        .authenticate(&req.public_key, &req.signature)
        .await?;

    tracing::info!(
        wallet = %issued.identity,
        registered = issued.registered,
        "session issued"
    );
    Ok((
        StatusCode::OK,
        Json(AuthenticateResponse {
            token: issued.session.credential,
            expires_at: issued.session.expires_at,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum AuthenticateError {
    #[error("invalid request body: {0}")]
    Body(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for AuthenticateError {
    fn into_response(self) -> Response {
        match self {
            AuthenticateError::Body(msg) => {
                message_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", msg))
            }
            AuthenticateError::Auth(AuthError::InvalidSignature)
            | AuthenticateError::Auth(AuthError::Unauthenticated) => {
                message_response(StatusCode::UNAUTHORIZED, "Invalid signature")
            }
            AuthenticateError::Auth(AuthError::Internal(e)) => {
                tracing::error!("AUTHENTICATE ERROR: {}", e);
                message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for AuthenticateRequest {
    type Response = AuthenticateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/authenticate")?;
        Ok(client.post(full_url).json(&self))
    }
}
