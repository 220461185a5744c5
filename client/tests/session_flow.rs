//! End-to-end session and wishlist flows against an in-process server.
//!
//! The server side is the real identity + wishlist routers with the real
//! JWT middleware, bound to an ephemeral port; the client side is the
//! public ApiClient/WishlistController API.

use std::sync::Arc;

use axum::Router;

use bookstore_client::{ApiClient, ClientError, MemoryTokenStore, WishlistController};
use bookstore_core::Module;
use bookstore_identity::api::middleware::{auth_middleware, AuthState};
use bookstore_identity::service::IdentityConfig;
use bookstore_identity::IdentityModule;
use bookstore_sql::sqlite::SqliteStore;
use bookstore_sql::SQLStore;
use bookstore_wishlist::WishlistModule;

async fn spawn_server() -> String {
    let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());

    let config = IdentityConfig {
        secure_cookies: false, // plain HTTP in tests
        ..Default::default()
    };
    let jwt_secret = config.jwt_secret.clone();

    let identity = IdentityModule::new(sql.clone(), config).unwrap();
    let wishlist = WishlistModule::new(sql.clone()).unwrap();

    let auth_state = Arc::new(AuthState::new(
        &jwt_secret,
        vec!["/api/auth/".to_string(), "/webhooks".to_string()],
    ));

    let app = Router::new()
        .merge(identity.routes())
        .merge(wishlist.routes())
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Box::new(MemoryTokenStore::new())).unwrap()
}

#[tokio::test]
async fn failed_login_issues_no_token_then_success_attaches() {
    let base = spawn_server().await;
    let api = client(&base);

    api.signup("Alice", "alice@example.com", "hunter2hunter2")
        .await
        .unwrap();
    api.logout().await;

    // Wrong password: the server's message surfaces and no token is
    // installed.
    let err = api.login("alice@example.com", "wrong-password").await;
    assert!(matches!(err, Err(ClientError::Api { status: 401, .. })));
    assert!(!api.session().is_authenticated());

    // Right password: the fresh token is attached to the next request.
    let user = api.login("alice@example.com", "hunter2hunter2").await.unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert!(api.get_wishlist().await.unwrap().is_empty());
}

#[tokio::test]
async fn unauthenticated_wishlist_access_is_rejected() {
    let base = spawn_server().await;
    let api = client(&base);

    // No token, no refresh cookie: the request goes out unauthenticated
    // after the single failed refresh attempt and the server rejects it.
    assert!(matches!(
        api.get_wishlist().await,
        Err(ClientError::Unauthenticated)
    ));
}

#[tokio::test]
async fn wishlist_toggle_round_trip() {
    let base = spawn_server().await;
    let api = client(&base);
    api.signup("Bob", "bob@example.com", "hunter2hunter2")
        .await
        .unwrap();

    let wl = WishlistController::new(api);

    assert!(wl.toggle("book-1").await.unwrap());
    assert!(wl.contains("book-1"));

    assert!(!wl.toggle("book-1").await.unwrap());
    assert!(!wl.contains("book-1"));
}

#[tokio::test]
async fn optimistic_state_survives_server_confirmation() {
    let base = spawn_server().await;
    let api = client(&base);
    api.signup("Carol", "carol@example.com", "hunter2hunter2")
        .await
        .unwrap();

    let wl = WishlistController::new(api);
    wl.toggle("book-9").await.unwrap();

    // The server's projection agrees with the optimistic one.
    let listed = wl.transport().get_wishlist().await.unwrap();
    assert_eq!(listed, vec!["book-9".to_string()]);
}

#[tokio::test]
async fn attach_refreshes_once_when_memory_token_is_gone() {
    let base = spawn_server().await;
    let api = client(&base);
    api.signup("Dave", "dave@example.com", "hunter2hunter2")
        .await
        .unwrap();

    // Simulate a dropped in-memory token. The refresh cookie is still
    // in the HTTP client's cookie store, so attach() recovers a token
    // with a single refresh call and the request succeeds.
    api.session().clear();
    assert!(!api.session().is_authenticated());

    assert!(api.get_wishlist().await.unwrap().is_empty());
    assert!(api.session().is_authenticated());
}

#[tokio::test]
async fn logout_clears_session_and_wishlist_requires_login_again() {
    let base = spawn_server().await;
    let api = client(&base);
    api.signup("Erin", "erin@example.com", "hunter2hunter2")
        .await
        .unwrap();
    assert!(api.get_wishlist().await.unwrap().is_empty());

    api.logout().await;
    assert!(!api.session().is_authenticated());

    // The refresh cookie was cleared by the server on logout, so the
    // recovery path has nothing to work with.
    assert!(matches!(
        api.get_wishlist().await,
        Err(ClientError::Unauthenticated)
    ));
}
