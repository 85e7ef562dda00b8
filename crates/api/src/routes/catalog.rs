//! Public catalog browsing and licensed code access.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ona_core::catalog::{
    Category, Component, ComponentCode, ComponentDetail, ComponentFilter, Subcategory,
};
use ona_shared::{PageRequest, PageResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiResult, AppState, middleware::AuthUser};

/// Largest page a listing returns.
pub(crate) const MAX_PER_PAGE: u32 = 100;

/// Routes open to anonymous visitors.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/subcategories", get(list_subcategories))
        .route("/components", get(list_components))
        .route("/components/{slug}", get(get_component))
}

/// Routes that need a signed-in user.
pub fn member_routes() -> Router<AppState> {
    Router::new().route("/components/{slug}/code", get(get_component_code))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing subcategories.
#[derive(Debug, Deserialize)]
pub struct SubcategoryQuery {
    /// Restrict to one category.
    pub category_id: Option<Uuid>,
}

/// Query parameters for listing components.
#[derive(Debug, Default, Deserialize)]
pub struct ComponentQuery {
    /// Restrict to one subcategory.
    pub subcategory_id: Option<Uuid>,
    /// Page number, 1-indexed.
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ComponentQuery {
    /// Page request with out-of-range values clamped.
    pub(crate) fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page).max(1),
            per_page: self
                .per_page
                .unwrap_or(defaults.per_page)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    pub(crate) fn filter(&self) -> ComponentFilter {
        ComponentFilter {
            subcategory_id: self.subcategory_id,
            published_only: false,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/categories`
async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// GET `/subcategories?category_id=...`
async fn list_subcategories(
    State(state): State<AppState>,
    Query(query): Query<SubcategoryQuery>,
) -> ApiResult<Json<Vec<Subcategory>>> {
    Ok(Json(state.catalog.list_subcategories(query.category_id).await?))
}

/// GET `/components`
///
/// Anonymous listings only include published components.
async fn list_components(
    State(state): State<AppState>,
    Query(query): Query<ComponentQuery>,
) -> ApiResult<Json<PageResponse<Component>>> {
    let page = query.page_request();
    let components = state
        .catalog
        .list_components(query.filter(), &page, None)
        .await?;
    Ok(Json(components))
}

/// GET `/components/{slug}`
async fn get_component(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ComponentDetail>> {
    Ok(Json(state.catalog.get_component_detail(&slug, None).await?))
}

/// GET `/components/{slug}/code`
///
/// Premium code is only returned to license holders and admins.
async fn get_component_code(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
) -> ApiResult<Json<ComponentCode>> {
    let code = state
        .catalog
        .get_component_code(&slug, &auth.viewer())
        .await?;
    Ok(Json(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let page = ComponentQuery::default().page_request();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 20);
    }

    #[test]
    fn test_page_request_clamps() {
        let query = ComponentQuery {
            page: Some(0),
            per_page: Some(10_000),
            ..ComponentQuery::default()
        };
        let page = query.page_request();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, MAX_PER_PAGE);
    }
}
