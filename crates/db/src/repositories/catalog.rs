//! Catalog repository for database operations.

use chrono::Utc;
use ona_core::catalog::{
    self, CatalogError, Category, Component, ComponentFilter, ComponentVersion,
    CreateCategoryInput, CreateComponentInput, CreateSubcategoryInput, CreateVersionInput,
    Subcategory, UpdateCategoryInput, UpdateComponentInput, UpdateSubcategoryInput,
};
use ona_shared::PageRequest;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::catalog_err;
use crate::entities::{categories, component_versions, components, subcategories};

/// Catalog repository backed by the catalog tables.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl catalog::CatalogRepository for CatalogStore {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(catalog_err("category"))?;

        Ok(models.into_iter().map(Category::from_model).collect())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, CatalogError> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(catalog_err("category"))?;

        Ok(model.map(Category::from_model))
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, CatalogError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(catalog_err("category"))?;

        Ok(model.map(Category::from_model))
    }

    async fn create_category(&self, input: CreateCategoryInput) -> Result<Category, CatalogError> {
        let now = Utc::now().into();
        let category = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            sort_order: Set(input.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = category
            .insert(&self.db)
            .await
            .map_err(catalog_err("category"))?;
        Ok(Category::from_model(model))
    }

    async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<Category, CatalogError> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(catalog_err("category"))?
            .ok_or_else(|| CatalogError::not_found("category", id))?;

        let mut active: categories::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(sort_order) = input.sort_order {
            active.sort_order = Set(sort_order);
        }
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&self.db)
            .await
            .map_err(catalog_err("category"))?;
        Ok(Category::from_model(model))
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), CatalogError> {
        categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(catalog_err("category"))?;
        Ok(())
    }

    async fn list_subcategories(
        &self,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Subcategory>, CatalogError> {
        let mut query = subcategories::Entity::find();
        if let Some(category_id) = category_id {
            query = query.filter(subcategories::Column::CategoryId.eq(category_id));
        }

        let models = query
            .order_by_asc(subcategories::Column::SortOrder)
            .order_by_asc(subcategories::Column::Name)
            .all(&self.db)
            .await
            .map_err(catalog_err("subcategory"))?;

        Ok(models.into_iter().map(Subcategory::from_model).collect())
    }

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<Subcategory>, CatalogError> {
        let model = subcategories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(catalog_err("subcategory"))?;

        Ok(model.map(Subcategory::from_model))
    }

    async fn find_subcategory_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Subcategory>, CatalogError> {
        let model = subcategories::Entity::find()
            .filter(subcategories::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(catalog_err("subcategory"))?;

        Ok(model.map(Subcategory::from_model))
    }

    async fn create_subcategory(
        &self,
        input: CreateSubcategoryInput,
    ) -> Result<Subcategory, CatalogError> {
        let now = Utc::now().into();
        let subcategory = subcategories::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(input.category_id),
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            sort_order: Set(input.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = subcategory
            .insert(&self.db)
            .await
            .map_err(catalog_err("subcategory"))?;
        Ok(Subcategory::from_model(model))
    }

    async fn update_subcategory(
        &self,
        id: Uuid,
        input: UpdateSubcategoryInput,
    ) -> Result<Subcategory, CatalogError> {
        let model = subcategories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(catalog_err("subcategory"))?
            .ok_or_else(|| CatalogError::not_found("subcategory", id))?;

        let mut active: subcategories::ActiveModel = model.into();
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(sort_order) = input.sort_order {
            active.sort_order = Set(sort_order);
        }
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&self.db)
            .await
            .map_err(catalog_err("subcategory"))?;
        Ok(Subcategory::from_model(model))
    }

    async fn delete_subcategory(&self, id: Uuid) -> Result<(), CatalogError> {
        subcategories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(catalog_err("subcategory"))?;
        Ok(())
    }

    async fn count_subcategories(&self, category_id: Uuid) -> Result<u64, CatalogError> {
        subcategories::Entity::find()
            .filter(subcategories::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(catalog_err("subcategory"))
    }

    async fn list_components(
        &self,
        filter: ComponentFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Component>, u64), CatalogError> {
        let mut query = components::Entity::find();
        if let Some(subcategory_id) = filter.subcategory_id {
            query = query.filter(components::Column::SubcategoryId.eq(subcategory_id));
        }
        if filter.published_only {
            query = query.filter(components::Column::IsPublished.eq(true));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(catalog_err("component"))?;

        let models = query
            .order_by_desc(components::Column::CreatedAt)
            .order_by_asc(components::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(catalog_err("component"))?;

        Ok((models.into_iter().map(Component::from_model).collect(), total))
    }

    async fn find_component(&self, id: Uuid) -> Result<Option<Component>, CatalogError> {
        let model = components::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(catalog_err("component"))?;

        Ok(model.map(Component::from_model))
    }

    async fn find_component_by_slug(&self, slug: &str) -> Result<Option<Component>, CatalogError> {
        let model = components::Entity::find()
            .filter(components::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(catalog_err("component"))?;

        Ok(model.map(Component::from_model))
    }

    async fn create_component(
        &self,
        input: CreateComponentInput,
    ) -> Result<Component, CatalogError> {
        let now = Utc::now().into();
        let component = components::ActiveModel {
            id: Set(Uuid::new_v4()),
            subcategory_id: Set(input.subcategory_id),
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            is_premium: Set(input.is_premium),
            is_published: Set(input.is_published),
            preview_url: Set(input.preview_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = component
            .insert(&self.db)
            .await
            .map_err(catalog_err("component"))?;
        Ok(Component::from_model(model))
    }

    async fn update_component(
        &self,
        id: Uuid,
        input: UpdateComponentInput,
    ) -> Result<Component, CatalogError> {
        let model = components::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(catalog_err("component"))?
            .ok_or_else(|| CatalogError::not_found("component", id))?;

        let mut active: components::ActiveModel = model.into();
        if let Some(subcategory_id) = input.subcategory_id {
            active.subcategory_id = Set(subcategory_id);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(is_premium) = input.is_premium {
            active.is_premium = Set(is_premium);
        }
        if let Some(is_published) = input.is_published {
            active.is_published = Set(is_published);
        }
        if let Some(preview_url) = input.preview_url {
            active.preview_url = Set(Some(preview_url));
        }
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&self.db)
            .await
            .map_err(catalog_err("component"))?;
        Ok(Component::from_model(model))
    }

    async fn delete_component(&self, id: Uuid) -> Result<(), CatalogError> {
        let txn = self.db.begin().await.map_err(catalog_err("component"))?;

        component_versions::Entity::delete_many()
            .filter(component_versions::Column::ComponentId.eq(id))
            .exec(&txn)
            .await
            .map_err(catalog_err("component version"))?;
        components::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(catalog_err("component"))?;

        txn.commit().await.map_err(catalog_err("component"))?;
        Ok(())
    }

    async fn count_components(&self, subcategory_id: Uuid) -> Result<u64, CatalogError> {
        components::Entity::find()
            .filter(components::Column::SubcategoryId.eq(subcategory_id))
            .count(&self.db)
            .await
            .map_err(catalog_err("component"))
    }

    async fn list_versions(&self, component_id: Uuid) -> Result<Vec<ComponentVersion>, CatalogError> {
        let models = component_versions::Entity::find()
            .filter(component_versions::Column::ComponentId.eq(component_id))
            .order_by_desc(component_versions::Column::CreatedAt)
            .order_by_desc(component_versions::Column::IsLatest)
            .all(&self.db)
            .await
            .map_err(catalog_err("component version"))?;

        Ok(models.into_iter().map(ComponentVersion::from_model).collect())
    }

    async fn latest_version(
        &self,
        component_id: Uuid,
    ) -> Result<Option<ComponentVersion>, CatalogError> {
        let model = component_versions::Entity::find()
            .filter(component_versions::Column::ComponentId.eq(component_id))
            .filter(component_versions::Column::IsLatest.eq(true))
            .one(&self.db)
            .await
            .map_err(catalog_err("component version"))?;

        Ok(model.map(ComponentVersion::from_model))
    }

    async fn create_version(
        &self,
        component_id: Uuid,
        input: CreateVersionInput,
    ) -> Result<ComponentVersion, CatalogError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(catalog_err("component version"))?;

        component_versions::Entity::update_many()
            .col_expr(component_versions::Column::IsLatest, Expr::value(false))
            .filter(component_versions::Column::ComponentId.eq(component_id))
            .filter(component_versions::Column::IsLatest.eq(true))
            .exec(&txn)
            .await
            .map_err(catalog_err("component version"))?;

        let version = component_versions::ActiveModel {
            id: Set(Uuid::new_v4()),
            component_id: Set(component_id),
            version: Set(input.version),
            code: Set(input.code),
            changelog: Set(input.changelog),
            is_latest: Set(true),
            created_at: Set(Utc::now().into()),
        };
        let model = version
            .insert(&txn)
            .await
            .map_err(catalog_err("component version"))?;

        txn.commit()
            .await
            .map_err(catalog_err("component version"))?;
        debug!(component_id = %component_id, version = %model.version, "latest version swapped");
        Ok(ComponentVersion::from_model(model))
    }
}

/// Conversion from a `SeaORM` row into its domain type.
trait FromModel<M> {
    fn from_model(model: M) -> Self;
}

impl FromModel<categories::Model> for Category {
    fn from_model(m: categories::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            sort_order: m.sort_order,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

impl FromModel<subcategories::Model> for Subcategory {
    fn from_model(m: subcategories::Model) -> Self {
        Self {
            id: m.id,
            category_id: m.category_id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            sort_order: m.sort_order,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

impl FromModel<components::Model> for Component {
    fn from_model(m: components::Model) -> Self {
        Self {
            id: m.id,
            subcategory_id: m.subcategory_id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            is_premium: m.is_premium,
            is_published: m.is_published,
            preview_url: m.preview_url,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

impl FromModel<component_versions::Model> for ComponentVersion {
    fn from_model(m: component_versions::Model) -> Self {
        Self {
            id: m.id,
            component_id: m.component_id,
            version: m.version,
            code: m.code,
            changelog: m.changelog,
            is_latest: m.is_latest,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}
