//! Route registration — module routes + system endpoints + auth middleware.

use std::sync::Arc;

use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use bookstore_identity::api::middleware::{auth_middleware, AuthState};

/// Paths that don't require authentication. Entries ending in `/` are
/// prefixes. Admin catalog endpoints live under `/api/book/` but check
/// the admin claim in their handlers; a presented token is validated by
/// the middleware even on public paths.
pub fn public_paths() -> Vec<String> {
    [
        "/",
        "/health",
        "/version",
        "/webhooks",
        "/api/auth/",
        "/api/book/",
        "/api/recommendations/book/",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Build the complete router with all module routes.
pub fn build_router(auth_state: Arc<AuthState>, module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/version", get(version));

    // Module routes are already Router<()> with their own state; paths
    // are absolute, so merge rather than nest.
    for (name, router) in module_routes {
        tracing::debug!(module = name, "mounting module routes");
        app = app.merge(router);
    }

    app.layer(middleware::from_fn_with_state(auth_state, auth_middleware))
}

async fn index() -> impl IntoResponse {
    "API is working"
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "bookstored",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
