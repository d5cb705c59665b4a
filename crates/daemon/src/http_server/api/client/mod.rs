use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

/// A request the typed client knows how to send.
///
/// Each endpoint's request type builds its own `RequestBuilder`, so the
/// route and method live next to the handler that serves them.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
