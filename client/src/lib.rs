//! Client library for the bookstore API.
//!
//! Holds the pieces the browser app keeps in its context provider: the
//! session cache (in-memory token plus an advisory durable copy), the
//! HTTP client that attaches credentials and refreshes at most once per
//! request, and the optimistic wishlist controller.
//!
//! Everything is an explicit, passed-in object with a defined lifecycle
//! — constructed at app start, torn down at logout — so the wishlist
//! controller can be tested against a mock transport without a network.

pub mod api;
pub mod error;
pub mod session;
pub mod store;
pub mod wishlist;

pub use api::ApiClient;
pub use error::ClientError;
pub use session::SessionCache;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use wishlist::{WishlistController, WishlistTransport};
