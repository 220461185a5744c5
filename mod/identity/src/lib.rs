//! Identity module — provider webhook sync + password sessions.
//!
//! # Resources
//!
//! - **User** — local record keyed by the provider's external identity
//!   (or a locally issued id for password signups)
//! - **Session** — refresh-token issuance record backing JWT rotation
//!
//! The webhook path (verify → normalize → reconcile) and the password
//! session path (login/signup/logout/refresh) are independent; both feed
//! the same users table.
//!
//! # Usage
//!
//! ```ignore
//! use bookstore_identity::{IdentityModule, service::IdentityConfig};
//!
//! let module = IdentityModule::new(sql, IdentityConfig::default())?;
//! let router = module.routes(); // merged at the application root
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use bookstore_core::Module;
use bookstore_sql::SQLStore;

use crate::service::{IdentityConfig, IdentityService};

/// Identity module implementing the Module trait.
pub struct IdentityModule {
    service: Arc<IdentityService>,
}

impl IdentityModule {
    /// Create a new IdentityModule, initializing the schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        config: IdentityConfig,
    ) -> Result<Self, bookstore_core::ServiceError> {
        let service = IdentityService::new(sql, config)
            .map_err(bookstore_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying IdentityService.
    pub fn service(&self) -> &Arc<IdentityService> {
        &self.service
    }
}

impl Module for IdentityModule {
    fn name(&self) -> &str {
        "identity"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
