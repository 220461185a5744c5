mod auth;
mod me;
pub mod middleware;
mod webhooks;

use std::sync::Arc;

use axum::Router;

use crate::service::IdentityService;

/// Shared application state.
pub type AppState = Arc<IdentityService>;

/// Build the identity API router.
///
/// Paths are absolute: `/webhooks` is fixed by the provider contract and
/// `/api/auth/*` by the client, so the binary merges this router at the
/// root. Authentication is applied by the binary's middleware; the only
/// handler here that needs claims is `/api/me`.
pub fn build_router(svc: Arc<IdentityService>) -> Router {
    Router::new()
        .merge(webhooks::routes())
        .merge(auth::routes())
        .merge(me::routes())
        .with_state(svc)
}
