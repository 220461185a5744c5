//! Auth endpoints — login, signup, logout, refresh.
//!
//! The access token travels in the JSON body; the refresh token only
//! ever in a secure httpOnly cookie scoped to `/api/auth`, so scripts
//! never see it and it only accompanies auth calls.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;

use bookstore_core::ServiceError;

use crate::api::AppState;
use crate::model::{AuthResponse, IssuedSession};

/// Cookie carrying the opaque refresh token.
pub const REFRESH_COOKIE: &str = "bookstore_refresh";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/refresh", post(refresh))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

async fn login(
    State(svc): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ServiceError> {
    let issued = svc
        .login(&body.email, &body.password)
        .map_err(ServiceError::from)?;
    Ok(respond(jar, issued, &svc))
}

async fn signup(
    State(svc): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignupRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ServiceError> {
    let issued = svc
        .signup(&body.name, &body.email, &body.password)
        .map_err(ServiceError::from)?;
    Ok(respond(jar, issued, &svc))
}

/// Logout always succeeds from the caller's point of view: the cookie is
/// cleared regardless of whether server-side revocation worked.
async fn logout(State(svc): State<AppState>, jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        if let Err(e) = svc.logout(cookie.value()) {
            tracing::warn!(error = %e, "session revocation on logout failed");
        }
    }
    (jar.remove(clear_cookie()), Json(json!({})))
}

async fn refresh(
    State(svc): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), ServiceError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ServiceError::Unauthorized("missing refresh token".into()))?;

    let issued = svc.refresh(&token).map_err(ServiceError::from)?;
    let body = json!({ "accessToken": issued.access_token });
    let jar = jar.add(refresh_cookie(
        issued.refresh_token,
        svc.refresh_ttl_secs(),
        svc.secure_cookies(),
    ));
    Ok((jar, Json(body)))
}

fn respond(
    jar: CookieJar,
    issued: IssuedSession,
    svc: &AppState,
) -> (CookieJar, Json<AuthResponse>) {
    let jar = jar.add(refresh_cookie(
        issued.refresh_token.clone(),
        svc.refresh_ttl_secs(),
        svc.secure_cookies(),
    ));
    (
        jar,
        Json(AuthResponse {
            access_token: issued.access_token,
            user: issued.user,
        }),
    )
}

fn refresh_cookie(token: String, ttl_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/api/auth")
        .max_age(time::Duration::seconds(ttl_secs))
        .build()
}

fn clear_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .path("/api/auth")
        .max_age(time::Duration::ZERO)
        .build()
}
