//! HTTP client for the bookstore API.
//!
//! Credential attachment: if the session cache holds a token, attach it;
//! otherwise attempt exactly one refresh before sending the request
//! unauthenticated. The single attempt is capped here explicitly —
//! never by recursing through the request path — so a rejected refreshed
//! token surfaces instead of looping.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::error::ClientError;
use crate::session::SessionCache;
use crate::store::TokenStore;
use crate::wishlist::WishlistTransport;

/// How long any single request may stay pending.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The signed-in user, as returned by login/signup.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload {
    access_token: String,
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistEntry {
    book_id: String,
}

/// Client for one server, owning the session cache.
///
/// The refresh cookie lives in the underlying reqwest cookie store, so
/// refresh works across restarts only while the process lives — the
/// durable token copy covers the gap.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionCache,
}

impl ApiClient {
    /// Create a client for the given server base URL.
    pub fn new(base_url: &str, store: Box<dyn TokenStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: SessionCache::new(store),
        })
    }

    /// The session cache, for callers that need to inspect auth state.
    pub fn session(&self) -> &SessionCache {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Auth ──

    /// Log in with email and password. On success the new access token
    /// replaces whatever the cache held.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserInfo, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let payload = parse_auth(resp).await?;
        self.session.set(&payload.access_token);
        Ok(payload.user)
    }

    /// Create an account and sign in.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserInfo, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/auth/signup"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        let payload = parse_auth(resp).await?;
        self.session.set(&payload.access_token);
        Ok(payload.user)
    }

    /// Log out. The server call is best-effort; local state is cleared
    /// regardless, so logout always succeeds for the caller.
    pub async fn logout(&self) {
        if let Err(e) = self.http.post(self.url("/api/auth/logout")).send().await {
            tracing::debug!(error = %e, "logout request failed; clearing local state anyway");
        }
        self.session.clear();
    }

    /// Exchange the refresh cookie for a new access token.
    pub async fn refresh(&self) -> Result<String, ClientError> {
        let resp = self.http.post(self.url("/api/auth/refresh")).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::RefreshInvalid);
        }
        let payload: RefreshPayload = resp.json().await?;
        self.session.set(&payload.access_token);
        Ok(payload.access_token)
    }

    /// Attach a credential and send. At most one refresh attempt; if
    /// that fails the request still goes out unauthenticated and the
    /// server's verdict stands.
    async fn send_authed(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let token = match self.session.bearer() {
            Some(t) => Some(t),
            None => match self.refresh().await {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::debug!(error = %e, "refresh failed; sending unauthenticated");
                    None
                }
            },
        };

        let req = match token {
            Some(t) => req.bearer_auth(t),
            None => req,
        };
        Ok(req.send().await?)
    }

    // ── Wishlist ──

    /// Fetch the authoritative wishlist projection.
    pub async fn get_wishlist(&self) -> Result<Vec<String>, ClientError> {
        let resp = self
            .send_authed(self.http.get(self.url("/api/wishlist")))
            .await?;
        let entries: Vec<WishlistEntry> = parse_json(resp).await?;
        Ok(entries.into_iter().map(|e| e.book_id).collect())
    }

    async fn add_to_wishlist(&self, book_id: &str) -> Result<(), ClientError> {
        let resp = self
            .send_authed(
                self.http
                    .post(self.url("/api/wishlist"))
                    .json(&json!({ "bookId": book_id })),
            )
            .await?;
        expect_success(resp).await
    }

    async fn remove_from_wishlist(&self, book_id: &str) -> Result<(), ClientError> {
        let resp = self
            .send_authed(
                self.http
                    .delete(self.url(&format!("/api/wishlist/{}", book_id))),
            )
            .await?;
        expect_success(resp).await
    }

    // ── Catalog ──

    /// All published books.
    pub async fn books(&self) -> Result<Vec<serde_json::Value>, ClientError> {
        let resp = self.http.get(self.url("/api/book/all")).send().await?;
        let body: serde_json::Value = parse_json(resp).await?;
        Ok(body["books"].as_array().cloned().unwrap_or_default())
    }

    /// Books similar to the given one, per the recommender. Empty when
    /// the recommender is absent.
    pub async fn similar_books(&self, book_id: &str) -> Result<Vec<serde_json::Value>, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/recommendations/book/{}", book_id)))
            .send()
            .await?;
        parse_json(resp).await
    }
}

impl WishlistTransport for ApiClient {
    fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    async fn add(&self, book_id: &str) -> Result<(), ClientError> {
        self.add_to_wishlist(book_id).await
    }

    async fn remove(&self, book_id: &str) -> Result<(), ClientError> {
        self.remove_from_wishlist(book_id).await
    }
}

/// Auth responses keep the server's message (e.g. "invalid credentials")
/// instead of collapsing 401s into [`ClientError::Unauthenticated`] —
/// the user is mid-login, so "prompt login" would be useless advice.
async fn parse_auth(resp: reqwest::Response) -> Result<AuthPayload, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::from_response(status.as_u16(), &body));
    }
    Ok(resp.json().await?)
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthenticated);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::from_response(status.as_u16(), &body));
    }
    Ok(resp.json().await?)
}

async fn expect_success(resp: reqwest::Response) -> Result<(), ClientError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthenticated);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::from_response(status.as_u16(), &body));
    }
    Ok(())
}
