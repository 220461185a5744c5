//! `bookstored` — the bookstore server binary.
//!
//! Usage:
//!   bookstored -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/bookstore/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use bookstore_catalog::CatalogModule;
use bookstore_core::Module;
use bookstore_identity::api::middleware::AuthState;
use bookstore_identity::service::IdentityConfig;
use bookstore_identity::IdentityModule;
use bookstore_sql::sqlite::SqliteStore;
use bookstore_sql::SQLStore;
use bookstore_wishlist::WishlistModule;

use config::ServerConfig;

/// Bookstore server.
#[derive(Parser, Debug)]
#[command(name = "bookstored", about = "Bookstore server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:3000")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load and verify server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    server_config.verify()?;

    // Initialize storage.
    std::fs::create_dir_all(&server_config.storage.data_dir)?;
    let sql: Arc<dyn SQLStore> = Arc::new(
        SqliteStore::open(&server_config.sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Initialize modules. Identity goes first: the wishlist schema
    // holds a foreign key into the users table.
    let identity_config = IdentityConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        webhook_secret: server_config.webhook.secret.clone(),
        access_token_ttl: server_config.jwt.access_ttl_secs,
        refresh_token_ttl: server_config.jwt.refresh_ttl_secs,
        webhook_tolerance_secs: server_config.webhook.tolerance_secs,
        admin_email: server_config.admin.email.clone(),
        secure_cookies: server_config.jwt.secure_cookies,
    };
    let identity_module = IdentityModule::new(Arc::clone(&sql), identity_config)?;
    info!("Identity module initialized");

    let wishlist_module = WishlistModule::new(Arc::clone(&sql))?;
    info!("Wishlist module initialized");

    let catalog_module =
        CatalogModule::new(Arc::clone(&sql), server_config.recommender.url.clone())?;
    info!("Catalog module initialized");

    let module_routes = vec![
        (identity_module.name(), identity_module.routes()),
        (wishlist_module.name(), wishlist_module.routes()),
        (catalog_module.name(), catalog_module.routes()),
    ];

    // Build JWT middleware state and the router.
    let auth_state = Arc::new(AuthState::new(
        &server_config.jwt.secret,
        routes::public_paths(),
    ));
    let app = routes::build_router(auth_state, module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Bookstore server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
