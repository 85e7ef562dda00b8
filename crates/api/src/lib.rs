//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for uploads, catalog and payment webhooks
//! - Authentication middleware and the admin guard
//! - Adapters from core provider traits to SMTP and the identity provider
//! - Error responses

pub mod adapters;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use ona_core::catalog::CatalogService;
use ona_core::files::FileService;
use ona_core::payments::PaymentService;
use ona_db::{CatalogStore, LicenseStore, UserStore};
use ona_shared::{JwtService, StripeConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use adapters::{HttpMagicLinkProvider, SmtpEmailSender};
pub use error::{ApiError, ApiResult};

/// Payment orchestrator wired to the database and real providers.
pub type Payments = PaymentService<UserStore, LicenseStore, HttpMagicLinkProvider, SmtpEmailSender>;

/// Catalog service wired to the database.
pub type Catalog = CatalogService<CatalogStore, LicenseStore>;

/// Multipart framing overhead allowed on top of the file size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Upload handling over the configured storage strategy.
    pub files: Arc<FileService>,
    /// Checkout provisioning.
    pub payments: Arc<Payments>,
    /// Component catalog.
    pub catalog: Arc<Catalog>,
    /// Webhook signing settings.
    pub stripe: Arc<StripeConfig>,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
