//! JWT authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, validates it, and injects
//! [`Claims`] for downstream handlers. Paths on the public list pass
//! through without a token; a presented token is still validated so
//! public handlers with optional personalization see claims too.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{DecodingKey, Validation};
use serde_json::json;

use bookstore_core::{bearer_token, Claims};

/// Shared state for the middleware: decoding key plus the public-path
/// list. The binary decides which paths are public; this module only
/// enforces the rule.
pub struct AuthState {
    decoding_key: DecodingKey,
    validation: Validation,
    public_paths: Vec<String>,
}

impl AuthState {
    /// Build middleware state from the JWT secret and a list of public
    /// paths. Entries ending in `/` match as prefixes; `/` itself and
    /// other entries match exactly.
    pub fn new(jwt_secret: &str, public_paths: Vec<String>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation: Validation::default(),
            public_paths,
        }
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| {
            if p == "/" {
                path == "/"
            } else if p.ends_with('/') {
                path.starts_with(p.as_str())
            } else {
                path == p
            }
        })
    }
}

/// Middleware entry point, for `middleware::from_fn_with_state`.
pub async fn auth_middleware(
    State(state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let public = state.is_public(&path);

    match bearer_token(request.headers()) {
        Some(token) => {
            match jsonwebtoken::decode::<Claims>(token, &state.decoding_key, &state.validation) {
                Ok(data) => {
                    request.extensions_mut().insert(data.claims);
                    next.run(request).await
                }
                Err(e) if public => {
                    tracing::debug!(error = %e, path = %path, "ignoring invalid token on public path");
                    next.run(request).await
                }
                Err(e) => unauthorized(format!("invalid token: {}", e)),
            }
        }
        None if public => next.run(request).await,
        None => unauthorized("missing authorization token".to_string()),
    }
}

fn unauthorized(message: String) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(json!({ "code": "UNAUTHENTICATED", "message": message })),
    )
        .into_response()
}
