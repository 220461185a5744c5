use axum::extract::{Extension, State};
use axum::routing::get;
use axum::{Json, Router};

use bookstore_core::{Claims, ServiceError};

use crate::api::AppState;
use crate::model::UserPublic;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/me", get(me))
}

/// GET /api/me — current user record for the authenticated caller.
async fn me(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<Json<UserPublic>, ServiceError> {
    let Extension(claims) =
        claims.ok_or_else(|| ServiceError::Unauthorized("missing token".into()))?;
    let user = svc.get_user(&claims.sub).map_err(ServiceError::from)?;
    Ok(Json(user.public()))
}
