//! Login handshake over HTTP: implicit registration, rejected signatures
//! and session expiry.

mod support;

use http::StatusCode;
use serde_json::json;
use time::{Duration, OffsetDateTime};

use common::auth::WalletIdentity;
use common::crypto::SecretKey;
use docvault_daemon::http_server::api::v0::authenticate::AuthenticateRequest;
use support::{get, post_json, TestApp};

#[tokio::test]
async fn test_first_login_registers_wallet() {
    let app = TestApp::new().await;

    let (wallet, token) = app.login().await;
    assert!(!token.is_empty());
    assert_eq!(app.state.database().count_wallets().await.unwrap(), 1);

    // Second login reuses the record
    let signature = wallet.sign(app.challenge.as_bytes());
    let body = serde_json::to_value(AuthenticateRequest::new(&wallet.public(), &signature)).unwrap();
    let (status, json) = app.authenticate(body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["expiresAt"].is_string());
    assert_eq!(app.state.database().count_wallets().await.unwrap(), 1);
}

#[tokio::test]
async fn test_tampered_signature_rejected() {
    let app = TestApp::new().await;
    let wallet = SecretKey::generate().unwrap();

    let mut signature = wallet.sign(app.challenge.as_bytes()).to_bytes().to_vec();
    signature[0] ^= 0x01;
    let body = json!({
        "publicKey": wallet.public().to_string(),
        "signature": signature,
    });

    let (status, json) = app.authenticate(body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid signature");
    assert!(json.get("token").is_none());
    assert_eq!(app.state.database().count_wallets().await.unwrap(), 0);
}

#[tokio::test]
async fn test_signature_over_other_message_rejected() {
    let app = TestApp::new().await;
    let wallet = SecretKey::generate().unwrap();
    let signature = wallet.sign(b"some other message");

    let body = serde_json::to_value(AuthenticateRequest::new(&wallet.public(), &signature)).unwrap();
    let (status, _) = app.authenticate(body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_inputs_rejected() {
    let app = TestApp::new().await;
    let wallet = SecretKey::generate().unwrap();
    let signature = wallet.sign(app.challenge.as_bytes()).to_bytes().to_vec();

    let (status, _) = app
        .authenticate(json!({ "publicKey": "not-base58-0OIl", "signature": signature }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .authenticate(json!({ "publicKey": wallet.public().to_string(), "signature": [1, 2, 3] }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.authenticate(json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.state.database().count_wallets().await.unwrap(), 0);
}

#[tokio::test]
async fn test_non_json_body_rejected() {
    let app = TestApp::new().await;
    let request = http::Request::builder()
        .method("POST")
        .uri("/api/v0/authenticate")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, json) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_concurrent_first_login_registers_once() {
    let temp = tempfile::tempdir().unwrap();
    let app = std::sync::Arc::new(TestApp::with_sqlite(temp.path().join("db.sqlite")).await);
    let wallet = SecretKey::generate().unwrap();
    let signature = wallet.sign(app.challenge.as_bytes());
    let body = serde_json::to_value(AuthenticateRequest::new(&wallet.public(), &signature)).unwrap();

    let attempts = (0..8)
        .map(|_| {
            let app = app.clone();
            let body = body.clone();
            tokio::spawn(async move { app.authenticate(body).await.0 })
        })
        .collect::<Vec<_>>();

    for attempt in attempts {
        assert_eq!(attempt.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(app.state.database().count_wallets().await.unwrap(), 1);
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = TestApp::new().await;

    let (status, json) = app.send(get("/api/v0/documents", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid or expired session");

    let (status, _) = app
        .send(get("/api/v0/documents", Some("not.a.token")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_cannot_create() {
    let app = TestApp::new().await;
    let (wallet, _) = app.login().await;

    let expired = app
        .state
        .authenticator()
        .issuer()
        .issue_at(
            &WalletIdentity::new(wallet.public()),
            OffsetDateTime::now_utc() - Duration::hours(2),
        )
        .unwrap();

    let body = json!({
        "encryptedCID": "AbC123==",
        "iv": "Xyz==",
        "fileHash": [1, 2, 3],
        "fileType": "application/pdf",
        "customFileName": "report.pdf",
    });
    let (status, _) = app
        .send(post_json(
            "/api/v0/documents",
            Some(expired.credential.as_str()),
            &body,
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.state.database().count_documents().await.unwrap(), 0);
}
