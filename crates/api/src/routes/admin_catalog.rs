//! Catalog management for admins.
//!
//! Admin listings include unpublished components. Code is written through
//! versions; publishing a version makes it the latest.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use ona_core::catalog::{
    Category, Component, ComponentVersion, CreateCategoryInput, CreateComponentInput,
    CreateSubcategoryInput, CreateVersionInput, Subcategory, UpdateCategoryInput,
    UpdateComponentInput, UpdateSubcategoryInput,
};
use ona_shared::PageResponse;
use tracing::info;
use uuid::Uuid;

use super::catalog::{ComponentQuery, SubcategoryQuery};
use crate::{ApiResult, AppState, middleware::AuthUser};

/// Creates the admin catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/admin/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route(
            "/admin/subcategories",
            get(list_subcategories).post(create_subcategory),
        )
        .route(
            "/admin/subcategories/{id}",
            get(get_subcategory)
                .patch(update_subcategory)
                .delete(delete_subcategory),
        )
        .route(
            "/admin/components",
            get(list_components).post(create_component),
        )
        .route(
            "/admin/components/{id}",
            get(get_component)
                .patch(update_component)
                .delete(delete_component),
        )
        .route(
            "/admin/components/{id}/versions",
            get(list_versions).post(create_version),
        )
}

// ============================================================================
// Categories
// ============================================================================

async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.catalog.get_category(id).await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.catalog.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.catalog.update_category(id, input).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Subcategories
// ============================================================================

async fn list_subcategories(
    State(state): State<AppState>,
    Query(query): Query<SubcategoryQuery>,
) -> ApiResult<Json<Vec<Subcategory>>> {
    Ok(Json(state.catalog.list_subcategories(query.category_id).await?))
}

async fn get_subcategory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Subcategory>> {
    Ok(Json(state.catalog.get_subcategory(id).await?))
}

async fn create_subcategory(
    State(state): State<AppState>,
    Json(input): Json<CreateSubcategoryInput>,
) -> ApiResult<(StatusCode, Json<Subcategory>)> {
    let subcategory = state.catalog.create_subcategory(input).await?;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

async fn update_subcategory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSubcategoryInput>,
) -> ApiResult<Json<Subcategory>> {
    Ok(Json(state.catalog.update_subcategory(id, input).await?))
}

async fn delete_subcategory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_subcategory(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Components
// ============================================================================

/// GET `/admin/components`, including unpublished ones.
async fn list_components(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ComponentQuery>,
) -> ApiResult<Json<PageResponse<Component>>> {
    let page = query.page_request();
    let viewer = auth.viewer();
    let components = state
        .catalog
        .list_components(query.filter(), &page, Some(&viewer))
        .await?;
    Ok(Json(components))
}

async fn get_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Component>> {
    Ok(Json(state.catalog.get_component(id).await?))
}

async fn create_component(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateComponentInput>,
) -> ApiResult<(StatusCode, Json<Component>)> {
    let component = state.catalog.create_component(input).await?;
    info!(user_id = %auth.user_id(), component_id = %component.id, "admin created component");
    Ok((StatusCode::CREATED, Json(component)))
}

async fn update_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateComponentInput>,
) -> ApiResult<Json<Component>> {
    Ok(Json(state.catalog.update_component(id, input).await?))
}

async fn delete_component(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_component(id).await?;
    info!(user_id = %auth.user_id(), component_id = %id, "admin deleted component");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Versions
// ============================================================================

async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ComponentVersion>>> {
    Ok(Json(state.catalog.list_versions(id).await?))
}

async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateVersionInput>,
) -> ApiResult<(StatusCode, Json<ComponentVersion>)> {
    let version = state.catalog.create_version(id, input).await?;
    Ok((StatusCode::CREATED, Json(version)))
}
