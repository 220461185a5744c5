use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use bookstore_core::{Claims, ServiceError};

use crate::service::WishlistService;

pub type AppState = Arc<WishlistService>;

/// One wishlist entry, as the client expects it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub book_id: String,
}

pub fn build_router(svc: Arc<WishlistService>) -> Router {
    Router::new()
        .route("/api/wishlist", get(list).post(add))
        .route("/api/wishlist/{bookId}", delete(remove))
        .with_state(svc)
}

async fn list(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<Json<Vec<WishlistEntry>>, ServiceError> {
    let claims = require_auth(claims)?;
    let ids = svc.list(&claims.sub).map_err(ServiceError::from)?;
    Ok(Json(
        ids.into_iter().map(|book_id| WishlistEntry { book_id }).collect(),
    ))
}

async fn add(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(entry): Json<WishlistEntry>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let claims = require_auth(claims)?;
    svc.add(&claims.sub, &entry.book_id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn remove(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(book_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let claims = require_auth(claims)?;
    svc.remove(&claims.sub, &book_id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

fn require_auth(claims: Option<Extension<Claims>>) -> Result<Claims, ServiceError> {
    claims
        .map(|Extension(c)| c)
        .ok_or_else(|| ServiceError::Unauthorized("missing token".into()))
}
