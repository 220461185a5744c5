//! Wishlist module — per-user book membership.
//!
//! Membership is a set: adding a present member or removing an absent
//! one is a no-op, which is what lets the client apply mutations
//! optimistically and reconcile afterwards. Authoritative state lives
//! here; the client holds a cached projection.

pub mod api;
pub mod service;

use std::sync::Arc;

use axum::Router;

use bookstore_core::Module;
use bookstore_sql::SQLStore;

use crate::service::WishlistService;

/// Wishlist module implementing the Module trait.
pub struct WishlistModule {
    service: Arc<WishlistService>,
}

impl WishlistModule {
    /// Create a new WishlistModule, initializing the schema.
    ///
    /// The users table must already exist: membership rows hold a
    /// foreign key into it so provider deletions cascade.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, bookstore_core::ServiceError> {
        let service = WishlistService::new(sql).map_err(bookstore_core::ServiceError::from)?;
        Ok(Self { service })
    }

    pub fn service(&self) -> &Arc<WishlistService> {
        &self.service
    }
}

impl Module for WishlistModule {
    fn name(&self) -> &str {
        "wishlist"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
