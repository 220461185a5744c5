use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use bookstore_core::{Claims, ServiceError};

use crate::model::{CreateBook, CreateComment};
use crate::recommend::RecommendationClient;
use crate::service::CatalogService;

/// Shared state for catalog routes.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub recommender: Arc<RecommendationClient>,
}

pub fn build_router(catalog: Arc<CatalogService>, recommender: Arc<RecommendationClient>) -> Router {
    let state = AppState {
        catalog,
        recommender,
    };
    Router::new()
        // Public storefront.
        .route("/api/book/all", get(all_books))
        .route("/api/book/add-comment", post(add_comment))
        .route("/api/book/comments", post(book_comments))
        .route("/api/book/{bookId}", get(book_by_id))
        // Admin surface.
        .route("/api/book/add", post(add_book))
        .route("/api/book/delete", post(delete_book))
        .route("/api/book/toggle-publish", post(toggle_publish))
        .route("/api/admin/comments", get(admin_comments))
        .route("/api/admin/approve-comment", post(approve_comment))
        .route("/api/admin/delete-comment", post(delete_comment))
        .route("/api/admin/dashboard", get(dashboard))
        // Recommendation proxy.
        .route("/api/recommendations", get(recommendations_for_user))
        .route("/api/recommendations/book/{bookId}", get(similar_books))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct IdBody {
    id: String,
}

// ── Storefront ──

async fn all_books(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServiceError> {
    let books = state.catalog.list_books(true).map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "books": books })))
}

async fn book_by_id(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let book = state.catalog.get_book(&book_id).map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "book": book })))
}

async fn add_comment(
    State(state): State<AppState>,
    Json(input): Json<CreateComment>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let comment = state.catalog.add_comment(input).map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "comment": comment })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookCommentsBody {
    book_id: String,
}

async fn book_comments(
    State(state): State<AppState>,
    Json(body): Json<BookCommentsBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let comments = state
        .catalog
        .comments_for_book(&body.book_id)
        .map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "comments": comments })))
}

// ── Admin ──

async fn add_book(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(input): Json<CreateBook>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    require_admin(claims)?;
    let book = state.catalog.add_book(input).map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "book": book })))
}

async fn delete_book(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(body): Json<IdBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    require_admin(claims)?;
    state.catalog.delete_book(&body.id).map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "message": "Book deleted successfully" })))
}

async fn toggle_publish(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(body): Json<IdBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    require_admin(claims)?;
    let published = state
        .catalog
        .toggle_publish(&body.id)
        .map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "published": published })))
}

async fn admin_comments(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    require_admin(claims)?;
    let comments = state.catalog.all_comments().map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "comments": comments })))
}

async fn approve_comment(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(body): Json<IdBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    require_admin(claims)?;
    state
        .catalog
        .approve_comment(&body.id)
        .map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "message": "Comment approved successfully" })))
}

async fn delete_comment(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(body): Json<IdBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    require_admin(claims)?;
    state
        .catalog
        .delete_comment(&body.id)
        .map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "message": "Comment deleted successfully" })))
}

async fn dashboard(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    require_admin(claims)?;
    let data = state.catalog.dashboard().map_err(ServiceError::from)?;
    Ok(Json(json!({ "success": true, "dashboardData": data })))
}

// ── Recommendations ──

async fn recommendations_for_user(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<Json<Vec<serde_json::Value>>, ServiceError> {
    let claims = require_auth(claims)?;
    Ok(Json(state.recommender.for_user(&claims.sub).await))
}

async fn similar_books(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Json<Vec<serde_json::Value>> {
    Json(state.recommender.similar_books(&book_id).await)
}

fn require_auth(claims: Option<Extension<Claims>>) -> Result<Claims, ServiceError> {
    claims
        .map(|Extension(c)| c)
        .ok_or_else(|| ServiceError::Unauthorized("missing token".into()))
}

fn require_admin(claims: Option<Extension<Claims>>) -> Result<Claims, ServiceError> {
    let claims = require_auth(claims)?;
    if !claims.admin {
        return Err(ServiceError::PermissionDenied(
            "admin token required".into(),
        ));
    }
    Ok(claims)
}
