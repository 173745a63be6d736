//! Identity verification for optional per-user features.
//!
//! Callers present a Firebase ID token as `Authorization: Bearer <token>`.
//! On the optimize routes a bad token only disables history for the request.

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const IDENTITY_TOOLKIT_LOOKUP_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("token did not resolve to a user")]
    UnknownUser,
}

/// Resolves a bearer token to a stable user id.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// Extracts the token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct LookupError {
    error: LookupErrorBody,
}

#[derive(Debug, Deserialize)]
struct LookupErrorBody {
    message: String,
}

/// Verifies Firebase ID tokens through the Identity Toolkit `accounts:lookup`
/// endpoint, which rejects expired, revoked and foreign-project tokens.
#[derive(Clone)]
pub struct FirebaseIdentityVerifier {
    client: Client,
    api_key: String,
}

impl FirebaseIdentityVerifier {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(IDENTITY_TOOLKIT_LOOKUP_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token: token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<LookupError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let lookup: LookupResponse = response.json().await?;
        lookup
            .users
            .into_iter()
            .next()
            .map(|u| u.local_id)
            .ok_or(AuthError::UnknownUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_has_no_token() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_other_schemes_are_ignored() {
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers_with("bearer lowercase")), None);
    }

    #[test]
    fn test_empty_bearer_token_is_ignored() {
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("Bearer    ")), None);
    }

    #[test]
    fn test_lookup_response_parses_local_id() {
        let lookup: LookupResponse =
            serde_json::from_str(r#"{"kind": "identitytoolkit#GetAccountInfoResponse", "users": [{"localId": "uid-123", "email": "a@b.c"}]}"#)
                .unwrap();
        assert_eq!(lookup.users[0].local_id, "uid-123");
    }
}
