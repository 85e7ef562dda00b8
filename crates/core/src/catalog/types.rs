//! Catalog entities and inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Top-level grouping, e.g. "Marketing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// URL slug, unique among categories.
    pub slug: String,
    /// Description.
    pub description: Option<String>,
    /// Position in listings.
    pub sort_order: i32,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Second-level grouping, e.g. "Hero Sections".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    /// Subcategory ID.
    pub id: Uuid,
    /// Parent category.
    pub category_id: Uuid,
    /// Display name.
    pub name: String,
    /// URL slug, unique among subcategories.
    pub slug: String,
    /// Description.
    pub description: Option<String>,
    /// Position in listings.
    pub sort_order: i32,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A sellable UI component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component ID.
    pub id: Uuid,
    /// Parent subcategory.
    pub subcategory_id: Uuid,
    /// Display name.
    pub name: String,
    /// URL slug, unique among components.
    pub slug: String,
    /// Description.
    pub description: Option<String>,
    /// Code requires an active license.
    pub is_premium: bool,
    /// Visible to non-admins.
    pub is_published: bool,
    /// Preview image or video URL.
    pub preview_url: Option<String>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A released revision of a component's code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVersion {
    /// Version ID.
    pub id: Uuid,
    /// Owning component.
    pub component_id: Uuid,
    /// Semantic version, unique per component.
    pub version: String,
    /// Source code.
    pub code: String,
    /// Release notes.
    pub changelog: Option<String>,
    /// Latest version of its component; at most one per component.
    pub is_latest: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Version metadata without the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    /// Version ID.
    pub id: Uuid,
    /// Semantic version.
    pub version: String,
    /// Release notes.
    pub changelog: Option<String>,
    /// Whether this is the latest version.
    pub is_latest: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&ComponentVersion> for VersionSummary {
    fn from(v: &ComponentVersion) -> Self {
        Self {
            id: v.id,
            version: v.version.clone(),
            changelog: v.changelog.clone(),
            is_latest: v.is_latest,
            created_at: v.created_at,
        }
    }
}

/// Public view of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDetail {
    /// The component.
    #[serde(flatten)]
    pub component: Component,
    /// Versions, newest first.
    pub versions: Vec<VersionSummary>,
}

/// A component's latest code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentCode {
    /// Component slug.
    pub slug: String,
    /// Version served.
    pub version: String,
    /// Source code.
    pub code: String,
}

/// Who is asking for catalog content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    /// Authenticated user.
    pub user_id: Uuid,
    /// Admins bypass publication and license checks.
    pub is_admin: bool,
}

/// Filter for component listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ComponentFilter {
    /// Restrict to one subcategory.
    pub subcategory_id: Option<Uuid>,
    /// Only published components.
    #[serde(default)]
    pub published_only: bool,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryInput {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    /// URL slug.
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    /// Description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Position in listings.
    #[serde(default)]
    pub sort_order: i32,
}

/// Input for updating a category. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    /// URL slug.
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    /// Description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Position in listings.
    pub sort_order: Option<i32>,
}

/// Input for creating a subcategory.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubcategoryInput {
    /// Parent category.
    pub category_id: Uuid,
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    /// URL slug.
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    /// Description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Position in listings.
    #[serde(default)]
    pub sort_order: i32,
}

/// Input for updating a subcategory. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSubcategoryInput {
    /// Move to another category.
    pub category_id: Option<Uuid>,
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    /// URL slug.
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    /// Description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Position in listings.
    pub sort_order: Option<i32>,
}

/// Input for creating a component.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComponentInput {
    /// Parent subcategory.
    pub subcategory_id: Uuid,
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    /// URL slug.
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    /// Description.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Code requires an active license.
    #[serde(default)]
    pub is_premium: bool,
    /// Visible to non-admins.
    #[serde(default)]
    pub is_published: bool,
    /// Preview image or video URL.
    #[validate(length(max = 2048))]
    pub preview_url: Option<String>,
}

/// Input for updating a component. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateComponentInput {
    /// Move to another subcategory.
    pub subcategory_id: Option<Uuid>,
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    /// URL slug.
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    /// Description.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Code requires an active license.
    pub is_premium: Option<bool>,
    /// Visible to non-admins.
    pub is_published: Option<bool>,
    /// Preview image or video URL.
    #[validate(length(max = 2048))]
    pub preview_url: Option<String>,
}

/// Input for releasing a component version.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVersionInput {
    /// Semantic version, `MAJOR.MINOR.PATCH[-pre]`.
    #[validate(custom(function = "validate_version"))]
    pub version: String,
    /// Source code.
    #[validate(length(min = 1, message = "Code must not be empty"))]
    pub code: String,
    /// Release notes.
    #[validate(length(max = 5000))]
    pub changelog: Option<String>,
}

/// Slugs are lowercase alphanumeric words joined by single hyphens.
///
/// # Errors
///
/// Returns a validation error for anything else.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid = !slug.is_empty()
        && slug.len() <= 100
        && slug
            .split('-')
            .all(|word| !word.is_empty() && word.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug");
        err.message = Some("Slug must be lowercase letters, digits and single hyphens".into());
        Err(err)
    }
}

/// Versions are `MAJOR.MINOR.PATCH` with an optional `-prerelease`.
///
/// # Errors
///
/// Returns a validation error for anything else.
pub fn validate_version(version: &str) -> Result<(), ValidationError> {
    let (core, pre) = match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (version, None),
    };

    let core_ok = {
        let parts: Vec<&str> = core.split('.').collect();
        parts.len() == 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
    };
    let pre_ok = pre.is_none_or(|pre| {
        pre.split('.').all(|id| {
            !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
    });

    if core_ok && pre_ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("version");
        err.message = Some("Version must look like 1.2.3 or 1.2.3-beta.1".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("buttons", true)]
    #[case("hero-sections", true)]
    #[case("card-2", true)]
    #[case("Hero", false)]
    #[case("hero--sections", false)]
    #[case("-hero", false)]
    #[case("hero-", false)]
    #[case("hero_sections", false)]
    #[case("", false)]
    fn test_validate_slug(#[case] slug: &str, #[case] ok: bool) {
        assert_eq!(validate_slug(slug).is_ok(), ok);
    }

    #[rstest]
    #[case("1.0.0", true)]
    #[case("10.20.30", true)]
    #[case("1.0.0-beta.1", true)]
    #[case("2.0.0-rc-1", true)]
    #[case("1.0", false)]
    #[case("v1.0.0", false)]
    #[case("1.0.0-", false)]
    #[case("1.0.0-beta..1", false)]
    fn test_validate_version(#[case] version: &str, #[case] ok: bool) {
        assert_eq!(validate_version(version).is_ok(), ok);
    }

    #[test]
    fn test_create_category_validation() {
        let input = CreateCategoryInput {
            name: String::new(),
            slug: "Bad Slug".to_string(),
            description: None,
            sort_order: 0,
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("slug"));
    }

    #[test]
    fn test_update_skips_absent_fields() {
        assert!(UpdateComponentInput::default().validate().is_ok());
        let input = UpdateComponentInput {
            slug: Some("Nope".to_string()),
            ..UpdateComponentInput::default()
        };
        assert!(input.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_generated_slugs_validate(words in proptest::collection::vec("[a-z0-9]{1,8}", 1..5)) {
            let slug = words.join("-");
            prop_assert!(validate_slug(&slug).is_ok());
        }
    }
}
