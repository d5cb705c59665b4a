use reqwest::{header::HeaderMap, header::HeaderValue, Client, StatusCode};
use url::Url;

use common::auth::SessionCredential;
use common::document::DocumentRecord;

use super::error::ApiError;
use super::ApiRequest;
use crate::http_server::api::v0::documents::{ListDocumentsRequest, NO_DOCUMENTS_MESSAGE};
use crate::http_server::api::MessageBody;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
    session: Option<SessionCredential>,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
            session: None,
        })
    }

    /// Attach `credential` as a bearer token to every request.
    pub fn with_session(mut self, credential: SessionCredential) -> Self {
        self.session = Some(credential);
        self
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let mut request_builder = request.build_request(&self.remote, &self.client)?;
        if let Some(session) = &self.session {
            request_builder = request_builder.bearer_auth(session.as_str());
        }
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// List the session's documents, treating "no documents" as an empty list.
    ///
    /// Any other 404, such as one from a server without this route, stays an error.
    pub async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ApiError> {
        match self.call(ListDocumentsRequest).await {
            Ok(response) => Ok(response.documents),
            Err(ApiError::HttpStatus(StatusCode::NOT_FOUND, ref body)) if is_no_documents(body) => {
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}

fn is_no_documents(body: &str) -> bool {
    serde_json::from_str::<MessageBody>(body)
        .map(|body| body.message == NO_DOCUMENTS_MESSAGE)
        .unwrap_or(false)
}
