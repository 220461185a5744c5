//! Shared JWT claims payload.
//!
//! Tokens are issued by the identity module and validated by the server
//! binary's middleware; every module that needs the current user extracts
//! `Extension<Claims>`. The type lives here so modules don't depend on
//! each other.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// JWT claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id (the external identity, or a locally issued id).
    pub sub: String,
    /// Email address at issue time.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Whether this user is the configured admin account.
    #[serde(default)]
    pub admin: bool,
    /// Session id backing this token.
    pub sid: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Extract the Bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn bearer_missing_or_malformed() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
