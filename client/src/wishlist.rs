//! Optimistic wishlist mutations.
//!
//! Each (user, book) pair is a two-state machine {Absent, Present} with
//! a pending flag. A toggle flips the cached state immediately, issues
//! the matching server call, and on any failure rolls back to the
//! pre-toggle state — the client never keeps showing a state the server
//! rejected. At most one mutation per book is in flight; a second
//! toggle while one is pending is rejected, never raced or dropped.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::error::ClientError;

/// The network seam for wishlist mutations.
///
/// [`crate::ApiClient`] implements this against the real server; tests
/// supply mocks, so the controller's state machine is exercised without
/// a network.
pub trait WishlistTransport {
    /// Whether a usable session exists right now.
    fn is_authenticated(&self) -> bool;

    /// Add the book server-side.
    fn add(&self, book_id: &str) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;

    /// Remove the book server-side.
    fn remove(&self, book_id: &str) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Default)]
struct State {
    cached: HashSet<String>,
    pending: HashSet<String>,
}

/// Owns the locally cached membership set; nothing else mutates it.
pub struct WishlistController<T: WishlistTransport> {
    transport: T,
    state: Mutex<State>,
}

impl<T: WishlistTransport> WishlistController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Mutex::new(State::default()),
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Replace the cached projection with the server's authoritative
    /// list (e.g. after login or an explicit refetch). Pending books are
    /// left alone — their in-flight toggles will settle them.
    pub fn replace(&self, book_ids: impl IntoIterator<Item = String>) {
        let mut st = self.state.lock();
        let pending: Vec<String> = st.pending.iter().cloned().collect();
        let keep: Vec<String> = pending
            .into_iter()
            .filter(|id| st.cached.contains(id))
            .collect();
        st.cached = book_ids.into_iter().collect();
        for id in keep {
            st.cached.insert(id);
        }
    }

    /// Whether the book is currently shown as wishlisted.
    pub fn contains(&self, book_id: &str) -> bool {
        self.state.lock().cached.contains(book_id)
    }

    /// Whether a toggle for the book is in flight.
    pub fn is_pending(&self, book_id: &str) -> bool {
        self.state.lock().pending.contains(book_id)
    }

    /// The cached membership, for rendering.
    pub fn items(&self) -> Vec<String> {
        self.state.lock().cached.iter().cloned().collect()
    }

    /// Toggle a book's membership. Returns the new membership on
    /// success.
    pub async fn toggle(&self, book_id: &str) -> Result<bool, ClientError> {
        if !self.transport.is_authenticated() {
            return Err(ClientError::Unauthenticated);
        }

        // Optimistic apply, under the lock, before any await.
        let adding = {
            let mut st = self.state.lock();
            if st.pending.contains(book_id) {
                return Err(ClientError::TogglePending(book_id.to_string()));
            }
            st.pending.insert(book_id.to_string());
            let adding = !st.cached.contains(book_id);
            if adding {
                st.cached.insert(book_id.to_string());
            } else {
                st.cached.remove(book_id);
            }
            adding
        };

        let result = if adding {
            self.transport.add(book_id).await
        } else {
            self.transport.remove(book_id).await
        };

        let mut st = self.state.lock();
        st.pending.remove(book_id);
        match result {
            Ok(()) => Ok(adding),
            Err(e) => {
                // Roll back to the pre-toggle state.
                if adding {
                    st.cached.remove(book_id);
                } else {
                    st.cached.insert(book_id.to_string());
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Semaphore;

    use super::*;

    struct MockTransport {
        authed: bool,
        fail: AtomicBool,
        calls: AtomicUsize,
        gate: Option<Arc<Semaphore>>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                authed: true,
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn signed_out() -> Self {
            Self {
                authed: false,
                ..Self::new()
            }
        }

        fn gated(gate: Arc<Semaphore>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }

        async fn call(&self) -> Result<(), ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                let _permit = gate.acquire().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                Err(ClientError::Api {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl WishlistTransport for Arc<MockTransport> {
        fn is_authenticated(&self) -> bool {
            self.authed
        }

        async fn add(&self, _book_id: &str) -> Result<(), ClientError> {
            self.call().await
        }

        async fn remove(&self, _book_id: &str) -> Result<(), ClientError> {
            self.call().await
        }
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let transport = Arc::new(MockTransport::new());
        let wl = WishlistController::new(transport.clone());

        assert!(wl.toggle("b1").await.unwrap());
        assert!(wl.contains("b1"));

        assert!(!wl.toggle("b1").await.unwrap());
        assert!(!wl.contains("b1"));

        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unauthenticated_toggle_is_rejected_before_any_state_change() {
        let transport = Arc::new(MockTransport::signed_out());
        let wl = WishlistController::new(transport.clone());

        assert!(matches!(
            wl.toggle("b1").await,
            Err(ClientError::Unauthenticated)
        ));
        assert!(!wl.contains("b1"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_rolls_back_to_pre_toggle_state() {
        let transport = Arc::new(MockTransport::new());
        let wl = WishlistController::new(transport.clone());

        // Failed add: membership stays absent.
        transport.fail.store(true, Ordering::SeqCst);
        assert!(wl.toggle("b1").await.is_err());
        assert!(!wl.contains("b1"));
        assert!(!wl.is_pending("b1"));

        // Successful add, then a failed remove: membership stays present.
        transport.fail.store(false, Ordering::SeqCst);
        wl.toggle("b1").await.unwrap();
        transport.fail.store(true, Ordering::SeqCst);
        assert!(wl.toggle("b1").await.is_err());
        assert!(wl.contains("b1"));
    }

    #[tokio::test]
    async fn second_toggle_while_pending_is_rejected() {
        let gate = Arc::new(Semaphore::new(0));
        let transport = Arc::new(MockTransport::gated(gate.clone()));
        let wl = Arc::new(WishlistController::new(transport.clone()));

        // First toggle parks inside the transport on the gate.
        let first = {
            let wl = wl.clone();
            tokio::spawn(async move { wl.toggle("b1").await })
        };
        tokio::task::yield_now().await;
        assert!(wl.is_pending("b1"));

        // Second toggle for the same book is rejected, and no second
        // request went out.
        assert!(matches!(
            wl.toggle("b1").await,
            Err(ClientError::TogglePending(_))
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        // A different book is independent.
        gate.add_permits(2);
        assert!(wl.toggle("b2").await.unwrap());

        // Let the first toggle finish; its optimistic state is final.
        assert!(first.await.unwrap().unwrap());
        assert!(wl.contains("b1"));
        assert!(!wl.is_pending("b1"));
    }

    #[tokio::test]
    async fn replace_keeps_pending_entries() {
        let gate = Arc::new(Semaphore::new(0));
        let transport = Arc::new(MockTransport::gated(gate.clone()));
        let wl = Arc::new(WishlistController::new(transport.clone()));

        let first = {
            let wl = wl.clone();
            tokio::spawn(async move { wl.toggle("b1").await })
        };
        tokio::task::yield_now().await;

        // A concurrent refetch that doesn't yet include the optimistic
        // add must not wipe it out.
        wl.replace(vec!["b9".to_string()]);
        assert!(wl.contains("b1"));
        assert!(wl.contains("b9"));

        gate.add_permits(1);
        first.await.unwrap().unwrap();
    }
}
