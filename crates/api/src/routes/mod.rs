//! API route definitions.

use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::{auth_middleware, require_admin};

pub mod admin_catalog;
pub mod catalog;
pub mod health;
pub mod uploads;
pub mod webhooks;

/// Creates the API router. Routes are grouped by the guard they sit behind.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Any authenticated user
    let member_routes = Router::new()
        .merge(catalog::member_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Authenticated admins; auth runs first as the outer layer
    let admin_routes = Router::new()
        .merge(uploads::routes())
        .merge(admin_catalog::routes())
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(webhooks::routes())
        .merge(catalog::public_routes())
        .merge(member_routes)
        .merge(admin_routes)
}
