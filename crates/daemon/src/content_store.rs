//! IPFS-backed content store
//!
//! Content is added through the node's HTTP API and read back through its
//! gateway, the same split a browser client would use.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use common::content_store::{parse_cid, ContentStore, ContentStoreError};
use common::prelude::Cid;

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Debug, Clone)]
pub struct IpfsStore {
    api_url: Url,
    gateway_url: Url,
    client: Client,
}

impl IpfsStore {
    pub fn new(api_url: Url, gateway_url: Url) -> Self {
        Self {
            api_url,
            gateway_url,
            client: Client::new(),
        }
    }

    fn endpoint(base: &Url, path: &str) -> Result<Url, ContentStoreError> {
        base.join(path)
            .map_err(|e| ContentStoreError::Backend(format!("bad url {}{}: {}", base, path, e)))
    }
}

fn backend(e: reqwest::Error) -> ContentStoreError {
    ContentStoreError::Backend(e.to_string())
}

#[async_trait]
impl ContentStore for IpfsStore {
    async fn put(&self, data: Bytes) -> Result<Cid, ContentStoreError> {
        let url = Self::endpoint(&self.api_url, "/api/v0/add")?;
        let size = data.len();
        let form = Form::new().part("file", Part::bytes(data.to_vec()).file_name("file"));

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(backend)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ContentStoreError::Backend(format!(
                "ipfs add failed with {}: {}",
                status, body
            )));
        }

        let added: AddResponse = response.json().await.map_err(backend)?;
        tracing::debug!(cid = %added.hash, size, "added content to ipfs");
        parse_cid(&added.hash)
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, ContentStoreError> {
        let url = Self::endpoint(&self.gateway_url, &format!("/ipfs/{}", cid))?;

        let response = self.client.get(url).send().await.map_err(backend)?;
        match response.status() {
            status if status.is_success() => response.bytes().await.map_err(backend),
            StatusCode::NOT_FOUND => Err(ContentStoreError::NotFound(*cid)),
            status => Err(ContentStoreError::Backend(format!(
                "ipfs gateway returned {} for {}",
                status, cid
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Multipart, Path, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use common::content_store::raw_cid;

    use super::*;

    type Blobs = Arc<Mutex<HashMap<String, Vec<u8>>>>;

    async fn add(State(blobs): State<Blobs>, mut multipart: Multipart) -> impl IntoResponse {
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some("file") {
                let data = field.bytes().await.unwrap_or_default().to_vec();
                let cid = raw_cid(&data).unwrap().to_string();
                blobs.lock().unwrap().insert(cid.clone(), data);
                return (
                    StatusCode::OK,
                    Json(serde_json::json!({ "Name": "file", "Hash": cid, "Size": "0" })),
                )
                    .into_response();
            }
        }
        StatusCode::BAD_REQUEST.into_response()
    }

    async fn cat(State(blobs): State<Blobs>, Path(cid): Path<String>) -> impl IntoResponse {
        match blobs.lock().unwrap().get(&cid) {
            Some(data) => (StatusCode::OK, data.clone()).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    /// Stand-in for an IPFS node serving both the API and the gateway.
    async fn fake_ipfs() -> Url {
        let router = Router::new()
            .route("/api/v0/add", post(add))
            .route("/ipfs/:cid", get(cat))
            .with_state(Blobs::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let url = fake_ipfs().await;
        let store = IpfsStore::new(url.clone(), url);

        let cid = store.put(Bytes::from_static(b"hello ipfs")).await.unwrap();
        assert_eq!(cid, raw_cid(b"hello ipfs").unwrap());
        assert_eq!(
            store.get(&cid).await.unwrap(),
            Bytes::from_static(b"hello ipfs")
        );
    }

    #[tokio::test]
    async fn test_get_missing() {
        let url = fake_ipfs().await;
        let store = IpfsStore::new(url.clone(), url);
        let cid = raw_cid(b"nobody added this").unwrap();
        assert!(matches!(
            store.get(&cid).await,
            Err(ContentStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        let url = Url::parse("http://127.0.0.1:9").unwrap();
        let store = IpfsStore::new(url.clone(), url);
        assert!(matches!(
            store.put(Bytes::from_static(b"x")).await,
            Err(ContentStoreError::Backend(_))
        ));
    }
}
