//! Catalog service: validation, uniqueness and access rules over a repository.

use std::future::Future;
use std::sync::Arc;

use ona_shared::{PageRequest, PageResponse};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::error::CatalogError;
use super::types::{
    Category, Component, ComponentCode, ComponentDetail, ComponentFilter, ComponentVersion,
    CreateCategoryInput, CreateComponentInput, CreateSubcategoryInput, CreateVersionInput,
    Subcategory, UpdateCategoryInput, UpdateComponentInput, UpdateSubcategoryInput,
    VersionSummary, Viewer,
};
use crate::payments::LicenseRepository;

/// Repository trait for catalog persistence.
///
/// Implementations map unique-constraint violations to
/// [`CatalogError::Conflict`].
pub trait CatalogRepository: Send + Sync {
    /// All categories ordered by `sort_order`, then name.
    fn list_categories(&self)
    -> impl Future<Output = Result<Vec<Category>, CatalogError>> + Send;

    /// Find a category by ID.
    fn find_category(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Category>, CatalogError>> + Send;

    /// Find a category by slug.
    fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Category>, CatalogError>> + Send;

    /// Insert a category.
    fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> impl Future<Output = Result<Category, CatalogError>> + Send;

    /// Apply the present fields of `input`.
    fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> impl Future<Output = Result<Category, CatalogError>> + Send;

    /// Delete a category.
    fn delete_category(&self, id: Uuid)
    -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// Subcategories, optionally restricted to one category.
    fn list_subcategories(
        &self,
        category_id: Option<Uuid>,
    ) -> impl Future<Output = Result<Vec<Subcategory>, CatalogError>> + Send;

    /// Find a subcategory by ID.
    fn find_subcategory(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Subcategory>, CatalogError>> + Send;

    /// Find a subcategory by slug.
    fn find_subcategory_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Subcategory>, CatalogError>> + Send;

    /// Insert a subcategory.
    fn create_subcategory(
        &self,
        input: CreateSubcategoryInput,
    ) -> impl Future<Output = Result<Subcategory, CatalogError>> + Send;

    /// Apply the present fields of `input`.
    fn update_subcategory(
        &self,
        id: Uuid,
        input: UpdateSubcategoryInput,
    ) -> impl Future<Output = Result<Subcategory, CatalogError>> + Send;

    /// Delete a subcategory.
    fn delete_subcategory(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// Number of subcategories under a category.
    fn count_subcategories(
        &self,
        category_id: Uuid,
    ) -> impl Future<Output = Result<u64, CatalogError>> + Send;

    /// One page of components matching `filter`, plus the total count.
    fn list_components(
        &self,
        filter: ComponentFilter,
        page: &PageRequest,
    ) -> impl Future<Output = Result<(Vec<Component>, u64), CatalogError>> + Send;

    /// Find a component by ID.
    fn find_component(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Component>, CatalogError>> + Send;

    /// Find a component by slug.
    fn find_component_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Component>, CatalogError>> + Send;

    /// Insert a component.
    fn create_component(
        &self,
        input: CreateComponentInput,
    ) -> impl Future<Output = Result<Component, CatalogError>> + Send;

    /// Apply the present fields of `input`.
    fn update_component(
        &self,
        id: Uuid,
        input: UpdateComponentInput,
    ) -> impl Future<Output = Result<Component, CatalogError>> + Send;

    /// Delete a component and its versions.
    fn delete_component(&self, id: Uuid)
    -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// Number of components under a subcategory.
    fn count_components(
        &self,
        subcategory_id: Uuid,
    ) -> impl Future<Output = Result<u64, CatalogError>> + Send;

    /// Versions of a component, newest first.
    fn list_versions(
        &self,
        component_id: Uuid,
    ) -> impl Future<Output = Result<Vec<ComponentVersion>, CatalogError>> + Send;

    /// The version flagged latest, if any.
    fn latest_version(
        &self,
        component_id: Uuid,
    ) -> impl Future<Output = Result<Option<ComponentVersion>, CatalogError>> + Send;

    /// Insert a version as latest and clear the flag on the previous latest,
    /// atomically.
    fn create_version(
        &self,
        component_id: Uuid,
        input: CreateVersionInput,
    ) -> impl Future<Output = Result<ComponentVersion, CatalogError>> + Send;
}

/// Catalog operations with slug uniqueness, dependents checks and the
/// premium gate.
pub struct CatalogService<C, L>
where
    C: CatalogRepository,
    L: LicenseRepository,
{
    catalog: Arc<C>,
    licenses: Arc<L>,
}

impl<C, L> CatalogService<C, L>
where
    C: CatalogRepository,
    L: LicenseRepository,
{
    /// Create a new catalog service.
    #[must_use]
    pub fn new(catalog: Arc<C>, licenses: Arc<L>) -> Self {
        Self { catalog, licenses }
    }

    // ============================================================================
    // Categories
    // ============================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.catalog.list_categories().await
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such category exists.
    pub async fn get_category(&self, id: Uuid) -> Result<Category, CatalogError> {
        self.catalog
            .find_category(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("category", id))
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input and `Conflict` if the slug is taken.
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<Category, CatalogError> {
        input.validate()?;
        if self.catalog.find_category_by_slug(&input.slug).await?.is_some() {
            return Err(CatalogError::slug_taken("category", &input.slug));
        }

        let category = self.catalog.create_category(input).await?;
        info!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound`, or `Conflict` on a slug clash.
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<Category, CatalogError> {
        input.validate()?;
        self.get_category(id).await?;
        if let Some(slug) = &input.slug
            && let Some(existing) = self.catalog.find_category_by_slug(slug).await?
            && existing.id != id
        {
            return Err(CatalogError::slug_taken("category", slug));
        }

        self.catalog.update_category(id, input).await
    }

    /// Delete a category with no subcategories.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `HasDependents` if subcategories remain.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), CatalogError> {
        self.get_category(id).await?;
        if self.catalog.count_subcategories(id).await? > 0 {
            warn!(category_id = %id, "refusing to delete category with subcategories");
            return Err(CatalogError::HasDependents { entity: "category" });
        }

        self.catalog.delete_category(id).await?;
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    // ============================================================================
    // Subcategories
    // ============================================================================

    /// List subcategories, optionally for one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list_subcategories(
        &self,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Subcategory>, CatalogError> {
        self.catalog.list_subcategories(category_id).await
    }

    /// Get a subcategory by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such subcategory exists.
    pub async fn get_subcategory(&self, id: Uuid) -> Result<Subcategory, CatalogError> {
        self.catalog
            .find_subcategory(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("subcategory", id))
    }

    /// Create a subcategory under an existing category.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound` for a missing parent, or `Conflict`.
    pub async fn create_subcategory(
        &self,
        input: CreateSubcategoryInput,
    ) -> Result<Subcategory, CatalogError> {
        input.validate()?;
        self.get_category(input.category_id).await?;
        if self
            .catalog
            .find_subcategory_by_slug(&input.slug)
            .await?
            .is_some()
        {
            return Err(CatalogError::slug_taken("subcategory", &input.slug));
        }

        let subcategory = self.catalog.create_subcategory(input).await?;
        info!(
            subcategory_id = %subcategory.id,
            category_id = %subcategory.category_id,
            "subcategory created"
        );
        Ok(subcategory)
    }

    /// Update a subcategory.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound`, or `Conflict` on a slug clash.
    pub async fn update_subcategory(
        &self,
        id: Uuid,
        input: UpdateSubcategoryInput,
    ) -> Result<Subcategory, CatalogError> {
        input.validate()?;
        self.get_subcategory(id).await?;
        if let Some(category_id) = input.category_id {
            self.get_category(category_id).await?;
        }
        if let Some(slug) = &input.slug
            && let Some(existing) = self.catalog.find_subcategory_by_slug(slug).await?
            && existing.id != id
        {
            return Err(CatalogError::slug_taken("subcategory", slug));
        }

        self.catalog.update_subcategory(id, input).await
    }

    /// Delete a subcategory with no components.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `HasDependents` if components remain.
    pub async fn delete_subcategory(&self, id: Uuid) -> Result<(), CatalogError> {
        self.get_subcategory(id).await?;
        if self.catalog.count_components(id).await? > 0 {
            warn!(subcategory_id = %id, "refusing to delete subcategory with components");
            return Err(CatalogError::HasDependents {
                entity: "subcategory",
            });
        }

        self.catalog.delete_subcategory(id).await?;
        info!(subcategory_id = %id, "subcategory deleted");
        Ok(())
    }

    // ============================================================================
    // Components
    // ============================================================================

    /// List components. Non-admin viewers only ever see published ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list_components(
        &self,
        mut filter: ComponentFilter,
        page: &PageRequest,
        viewer: Option<&Viewer>,
    ) -> Result<PageResponse<Component>, CatalogError> {
        if !viewer.is_some_and(|v| v.is_admin) {
            filter.published_only = true;
        }

        let (data, total) = self.catalog.list_components(filter, page).await?;
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Get a component by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such component exists.
    pub async fn get_component(&self, id: Uuid) -> Result<Component, CatalogError> {
        self.catalog
            .find_component(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("component", id))
    }

    /// Public component view with version history.
    ///
    /// Unpublished components are reported as missing to non-admins.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the component does not exist or is hidden.
    pub async fn get_component_detail(
        &self,
        slug: &str,
        viewer: Option<&Viewer>,
    ) -> Result<ComponentDetail, CatalogError> {
        let component = self.visible_component(slug, viewer).await?;
        let versions = self
            .catalog
            .list_versions(component.id)
            .await?
            .iter()
            .map(VersionSummary::from)
            .collect();

        Ok(ComponentDetail {
            component,
            versions,
        })
    }

    /// Create a component under an existing subcategory.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound` for a missing parent, or `Conflict`.
    pub async fn create_component(
        &self,
        input: CreateComponentInput,
    ) -> Result<Component, CatalogError> {
        input.validate()?;
        self.get_subcategory(input.subcategory_id).await?;
        if self
            .catalog
            .find_component_by_slug(&input.slug)
            .await?
            .is_some()
        {
            return Err(CatalogError::slug_taken("component", &input.slug));
        }

        let component = self.catalog.create_component(input).await?;
        info!(
            component_id = %component.id,
            slug = %component.slug,
            is_premium = component.is_premium,
            "component created"
        );
        Ok(component)
    }

    /// Update a component.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound`, or `Conflict` on a slug clash.
    pub async fn update_component(
        &self,
        id: Uuid,
        input: UpdateComponentInput,
    ) -> Result<Component, CatalogError> {
        input.validate()?;
        self.get_component(id).await?;
        if let Some(subcategory_id) = input.subcategory_id {
            self.get_subcategory(subcategory_id).await?;
        }
        if let Some(slug) = &input.slug
            && let Some(existing) = self.catalog.find_component_by_slug(slug).await?
            && existing.id != id
        {
            return Err(CatalogError::slug_taken("component", slug));
        }

        self.catalog.update_component(id, input).await
    }

    /// Delete a component together with its versions.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such component exists.
    pub async fn delete_component(&self, id: Uuid) -> Result<(), CatalogError> {
        self.get_component(id).await?;
        self.catalog.delete_component(id).await?;
        info!(component_id = %id, "component deleted");
        Ok(())
    }

    // ============================================================================
    // Versions
    // ============================================================================

    /// Versions of a component, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the component does not exist.
    pub async fn list_versions(
        &self,
        component_id: Uuid,
    ) -> Result<Vec<ComponentVersion>, CatalogError> {
        self.get_component(component_id).await?;
        self.catalog.list_versions(component_id).await
    }

    /// Release a new version and make it the latest.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound`, or `Conflict` if the version string
    /// already exists for this component.
    pub async fn create_version(
        &self,
        component_id: Uuid,
        input: CreateVersionInput,
    ) -> Result<ComponentVersion, CatalogError> {
        input.validate()?;
        self.get_component(component_id).await?;
        let existing = self.catalog.list_versions(component_id).await?;
        if existing.iter().any(|v| v.version == input.version) {
            return Err(CatalogError::Conflict(format!(
                "version {} already exists for this component",
                input.version
            )));
        }

        let version = self.catalog.create_version(component_id, input).await?;
        info!(
            component_id = %component_id,
            version = %version.version,
            "component version released"
        );
        Ok(version)
    }

    /// Latest code of a component.
    ///
    /// Premium components require an active license unless the viewer is an
    /// admin.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the component is missing, hidden or has no
    /// versions, and `PremiumRequired` if the gate rejects the viewer.
    pub async fn get_component_code(
        &self,
        slug: &str,
        viewer: &Viewer,
    ) -> Result<ComponentCode, CatalogError> {
        let component = self.visible_component(slug, Some(viewer)).await?;

        if component.is_premium
            && !viewer.is_admin
            && !self.licenses.has_active_license(viewer.user_id).await?
        {
            info!(
                user_id = %viewer.user_id,
                component = %component.slug,
                "premium code requested without license"
            );
            return Err(CatalogError::PremiumRequired(component.slug));
        }

        let latest = self
            .catalog
            .latest_version(component.id)
            .await?
            .ok_or_else(|| CatalogError::not_found("component version", &component.slug))?;

        Ok(ComponentCode {
            slug: component.slug,
            version: latest.version,
            code: latest.code,
        })
    }

    async fn visible_component(
        &self,
        slug: &str,
        viewer: Option<&Viewer>,
    ) -> Result<Component, CatalogError> {
        let is_admin = viewer.is_some_and(|v| v.is_admin);
        self.catalog
            .find_component_by_slug(slug)
            .await?
            .filter(|c| c.is_published || is_admin)
            .ok_or_else(|| CatalogError::not_found("component", slug))
    }
}
