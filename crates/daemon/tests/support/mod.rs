#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::Body;
use axum::Router;
use http::{Request, Response, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use common::crypto::{Challenge, SecretKey};
use docvault_daemon::http_server::{self, api::v0::authenticate::AuthenticateRequest};
use docvault_daemon::{ServiceConfig, ServiceState};

pub struct TestApp {
    pub router: Router,
    pub state: ServiceState,
    pub challenge: Challenge,
}

impl TestApp {
    /// App backed by an in-memory database
    pub async fn new() -> Self {
        Self::with_config(ServiceConfig::default()).await
    }

    /// App backed by a sqlite file at `path`
    pub async fn with_sqlite(path: PathBuf) -> Self {
        std::fs::write(&path, "").unwrap();
        Self::with_config(ServiceConfig {
            sqlite_path: Some(path),
            ..Default::default()
        })
        .await
    }

    async fn with_config(config: ServiceConfig) -> Self {
        let challenge = config.challenge.clone();
        let state = ServiceState::from_config(&config).await.unwrap();
        let http_config = http_server::Config::new(SocketAddr::from(([127, 0, 0, 1], 0)));
        Self {
            router: http_server::router(http_config, state.clone()),
            state,
            challenge,
        }
    }

    /// Serve the router on a local port, returning its base url
    pub async fn serve(&self) -> url::Url {
        serve_router(self.router.clone()).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        read_json(response).await
    }

    pub async fn authenticate(&self, body: Value) -> (StatusCode, Value) {
        self.send(post_json("/api/v0/authenticate", None, &body)).await
    }

    /// Log a fresh wallet in, returning it with its bearer token
    pub async fn login(&self) -> (SecretKey, String) {
        let wallet = SecretKey::generate().unwrap();
        let signature = wallet.sign(self.challenge.as_bytes());
        let body = serde_json::to_value(AuthenticateRequest::new(&wallet.public(), &signature))
            .unwrap();

        let (status, json) = self.authenticate(body).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", json);
        let token = json["token"].as_str().unwrap().to_string();
        (wallet, token)
    }
}

pub async fn serve_router(router: Router) -> url::Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await });
    url::Url::parse(&format!("http://{}", addr)).unwrap()
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}
