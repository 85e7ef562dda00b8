//! Database seeder for Ona UI development and testing.
//!
//! Seeds an admin account and a small starter catalog, then prints an admin
//! access token for local API calls. Safe to run repeatedly.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use ona_core::catalog::{
    CatalogError, CatalogService, CreateCategoryInput, CreateComponentInput,
    CreateSubcategoryInput, CreateVersionInput, Viewer,
};
use ona_db::{CatalogStore, LicenseStore, UserStore};
use ona_shared::{AppConfig, JwtConfig, JwtService, Role};

const ADMIN_EMAIL: &str = "admin@ona-ui.dev";

/// (category, subcategory, component slug, name, premium)
const STARTER_COMPONENTS: &[(&str, &str, &str, &str, bool)] = &[
    ("marketing", "heroes", "split-hero", "Split Hero", false),
    ("marketing", "pricing", "pricing-grid", "Pricing Grid", true),
    ("application", "forms", "sign-in-card", "Sign-in Card", false),
    ("application", "tables", "data-table", "Data Table", true),
];

type Catalog = CatalogService<CatalogStore, LicenseStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    println!("Connecting to database...");
    let db = ona_db::connect(&config.database.url).await?;

    println!("Seeding admin user...");
    let admin = UserStore::new(db.clone())
        .ensure_admin(ADMIN_EMAIL, "Ona Admin")
        .await?;
    println!("  Admin: {} ({})", admin.email, admin.id);

    let catalog = CatalogService::new(
        Arc::new(CatalogStore::new(db.clone())),
        Arc::new(LicenseStore::new(db)),
    );
    let viewer = Viewer {
        user_id: admin.id,
        is_admin: true,
    };

    println!("Seeding catalog...");
    let mut created = 0;
    for (category, subcategory, slug, name, premium) in STARTER_COMPONENTS {
        if seed_component(&catalog, &viewer, category, subcategory, slug, name, *premium).await? {
            created += 1;
        }
    }
    println!("  Created {created} components");

    let jwt = JwtService::new(JwtConfig::from(&config.jwt));
    let token = jwt.generate_access_token(admin.id, &admin.email, Role::Admin)?;
    println!("Seeding complete!");
    println!();
    println!("Admin access token (expires in {}s):", jwt.access_token_expires_in());
    println!("{token}");

    Ok(())
}

/// Returns `false` if the component already existed.
async fn seed_component(
    catalog: &Catalog,
    viewer: &Viewer,
    category_slug: &str,
    subcategory_slug: &str,
    slug: &str,
    name: &str,
    is_premium: bool,
) -> anyhow::Result<bool> {
    if catalog.get_component_detail(slug, Some(viewer)).await.is_ok() {
        println!("  {slug} already exists, skipping...");
        return Ok(false);
    }

    let category_id = match catalog
        .create_category(CreateCategoryInput {
            name: title_case(category_slug),
            slug: category_slug.to_string(),
            description: None,
            sort_order: 0,
        })
        .await
    {
        Ok(category) => category.id,
        Err(CatalogError::Conflict(_)) => catalog
            .list_categories()
            .await?
            .into_iter()
            .find(|c| c.slug == category_slug)
            .map(|c| c.id)
            .ok_or_else(|| anyhow::anyhow!("category {category_slug} vanished"))?,
        Err(e) => return Err(e.into()),
    };

    let subcategory_id = match catalog
        .create_subcategory(CreateSubcategoryInput {
            category_id,
            name: title_case(subcategory_slug),
            slug: subcategory_slug.to_string(),
            description: None,
            sort_order: 0,
        })
        .await
    {
        Ok(subcategory) => subcategory.id,
        Err(CatalogError::Conflict(_)) => catalog
            .list_subcategories(Some(category_id))
            .await?
            .into_iter()
            .find(|s| s.slug == subcategory_slug)
            .map(|s| s.id)
            .ok_or_else(|| anyhow::anyhow!("subcategory {subcategory_slug} vanished"))?,
        Err(e) => return Err(e.into()),
    };

    let component = catalog
        .create_component(CreateComponentInput {
            subcategory_id,
            name: name.to_string(),
            slug: slug.to_string(),
            description: Some(format!("{name} starter component")),
            is_premium,
            is_published: true,
            preview_url: None,
        })
        .await?;

    catalog
        .create_version(
            component.id,
            CreateVersionInput {
                version: "1.0.0".to_string(),
                code: format!("<div class=\"{slug}\">{name}</div>"),
                changelog: Some("Initial release".to_string()),
            },
        )
        .await?;

    println!("  Created {slug}");
    Ok(true)
}

fn title_case(slug: &str) -> String {
    let mut chars = slug.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
