use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http::header::AUTHORIZATION;
use http::request::Parts;

use common::auth::WalletIdentity;

use super::message_response;
use crate::ServiceState;

/// The wallet behind the request's bearer credential.
///
/// Handlers that take this extractor never run for requests with a missing,
/// malformed or expired credential.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedWallet(pub WalletIdentity);

#[derive(Debug, thiserror::Error)]
#[error("unauthenticated")]
pub struct SessionRejection;

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        message_response(StatusCode::UNAUTHORIZED, "Invalid or expired session")
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
}

#[async_trait]
impl FromRequestParts<ServiceState> for AuthenticatedWallet {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        state
            .authenticator()
            .authorize(bearer_token(parts))
            .map(AuthenticatedWallet)
            .map_err(|_| SessionRejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = http::Request::builder();
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts(Some("bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts(Some("abc"))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }
}
