use serde::{Deserialize, Serialize};

use crate::model::UserPublic;

/// A session record backing one refresh token.
///
/// The access token is stateless; rotation revokes this row and writes a
/// new one. An issued access token is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session id, also the `sid` claim of access tokens it backs.
    pub id: String,
    pub user_id: String,
    /// Opaque refresh credential. Unique-indexed; delivered only via a
    /// secure httpOnly cookie.
    pub refresh_token: String,
    pub revoked: bool,
    pub issued_at: String,
    pub expires_at: String,
}

/// Everything produced by a successful login/signup/refresh.
///
/// The handler splits this: the access token and user go into the JSON
/// body, the refresh token into the cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserPublic,
}

/// JSON body for login and signup responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserPublic,
}
