//! The client session cache.
//!
//! Two copies of the access token exist: the in-memory one (cleared when
//! the process ends) and the durable one behind a [`TokenStore`]. The
//! in-memory copy, when present, is always authoritative — a stale
//! durable token never silently overrides a fresher in-memory one. The
//! durable copy is read once, at construction, to survive restarts.

use parking_lot::Mutex;

use crate::store::TokenStore;

/// Holds the current access token for one app session.
pub struct SessionCache {
    token: Mutex<Option<String>>,
    store: Box<dyn TokenStore>,
}

impl SessionCache {
    /// Create a cache, seeding the in-memory token from the durable
    /// copy if one exists.
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        let seed = store.load();
        Self {
            token: Mutex::new(seed),
            store,
        }
    }

    /// The token to attach to outgoing requests, if any.
    pub fn bearer(&self) -> Option<String> {
        self.token.lock().clone()
    }

    /// Whether a credential is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.token.lock().is_some()
    }

    /// Install a freshly issued token in both copies.
    pub fn set(&self, token: &str) {
        *self.token.lock() = Some(token.to_string());
        self.store.save(token);
    }

    /// Drop both copies. Called on logout.
    pub fn clear(&self) {
        *self.token.lock() = None;
        self.store.clear();
    }
}
