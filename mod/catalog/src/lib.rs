//! Catalog module — books, comments, and the recommendation proxy.

pub mod api;
pub mod model;
pub mod recommend;
pub mod service;

use std::sync::Arc;

use axum::Router;

use bookstore_core::Module;
use bookstore_sql::SQLStore;

use crate::recommend::RecommendationClient;
use crate::service::CatalogService;

/// Catalog module implementing the Module trait.
pub struct CatalogModule {
    service: Arc<CatalogService>,
    recommender: Arc<RecommendationClient>,
}

impl CatalogModule {
    /// Create a new CatalogModule, initializing the schema.
    ///
    /// `recommender_url` is optional — the proxy degrades to empty
    /// results when no recommender is configured.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        recommender_url: Option<String>,
    ) -> Result<Self, bookstore_core::ServiceError> {
        let service = CatalogService::new(sql).map_err(bookstore_core::ServiceError::from)?;
        let recommender = Arc::new(RecommendationClient::new(recommender_url));
        Ok(Self {
            service,
            recommender,
        })
    }

    pub fn service(&self) -> &Arc<CatalogService> {
        &self.service
    }
}

impl Module for CatalogModule {
    fn name(&self) -> &str {
        "catalog"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.recommender.clone())
    }
}
