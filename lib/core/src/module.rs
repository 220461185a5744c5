use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module (identity, catalog, wishlist) implements this
/// trait to register its API endpoints. The binary entry point collects
/// all modules and merges their routes into a single Router. Routes are
/// absolute — the webhook and auth paths are fixed by external contracts,
/// so modules are merged at the root rather than nested under a prefix.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes, already bound to their own state.
    fn routes(&self) -> Router;
}
