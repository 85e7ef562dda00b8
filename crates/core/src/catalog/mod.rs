//! Component catalog: categories, subcategories, components and their
//! versioned code.
//!
//! Slugs are unique per entity type. Parents with children cannot be
//! deleted. Code of premium components is gated on an active license.

mod error;
mod service;
mod types;


pub use error::CatalogError;
pub use service::{CatalogRepository, CatalogService};
pub use types::{
    Category, Component, ComponentCode, ComponentDetail, ComponentFilter, ComponentVersion,
    CreateCategoryInput, CreateComponentInput, CreateSubcategoryInput, CreateVersionInput,
    Subcategory, UpdateCategoryInput, UpdateComponentInput, UpdateSubcategoryInput,
    VersionSummary, Viewer, validate_slug, validate_version,
};
