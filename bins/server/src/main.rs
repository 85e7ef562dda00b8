//! Ona UI API Server
//!
//! Main entry point for the marketplace backend service.

use std::sync::Arc;
use std::time::Duration;

use ona_api::{
    AppState, Catalog, HttpMagicLinkProvider, Payments, SmtpEmailSender, create_router,
};
use ona_core::files::FileService;
use ona_core::storage::{StorageConfig, StorageDisk, StorageResolver};
use ona_db::{CatalogStore, LicenseStore, UserStore};
use ona_shared::{AppConfig, EmailService, JwtConfig, JwtService};
use sea_orm::{ConnectOptions, Database};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ona=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    // Connect to database
    let mut options = ConnectOptions::new(config.database.url.clone());
    options
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    info!("Connected to database");

    // Storage
    let storage_config = StorageConfig::from_settings(&config.storage)?;
    let resolver = Arc::new(StorageResolver::from_config(&storage_config)?);
    info!(strategy = %resolver.strategy(), "storage ready");
    let files = Arc::new(FileService::new(resolver, &storage_config));

    // Repositories
    let users = Arc::new(UserStore::new(db.clone()));
    let licenses = Arc::new(LicenseStore::new(db.clone()));
    let catalog_store = Arc::new(CatalogStore::new(db));

    // Outbound providers
    if config.stripe.webhook_secret.is_empty() {
        warn!("stripe webhook secret is not set, webhooks will be rejected");
    }
    let email_service = EmailService::new(config.email.clone());
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );
    let mailer = Arc::new(SmtpEmailSender::new(Arc::new(email_service)));
    let magic_links = Arc::new(HttpMagicLinkProvider::new(&config.identity));

    let payments = Arc::new(Payments::new(
        users,
        Arc::clone(&licenses),
        magic_links,
        mailer,
    ));
    let catalog = Arc::new(Catalog::new(catalog_store, licenses));

    let state = AppState {
        jwt_service: Arc::new(JwtService::new(JwtConfig::from(&config.jwt))),
        files,
        payments,
        catalog,
        stripe: Arc::new(config.stripe.clone()),
        max_upload_bytes: storage_config.max_file_size,
    };

    let mut app = create_router(state);

    // The local public disk is served straight from its root
    let local = &config.storage.local;
    if storage_config.disks.contains_key(&StorageDisk::Public) && local.public_url.starts_with('/')
    {
        info!(url = %local.public_url, root = %local.public_root, "serving public disk");
        app = app.nest_service(&local.public_url, ServeDir::new(&local.public_root));
    }

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
