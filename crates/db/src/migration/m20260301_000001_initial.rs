//! Initial schema: users, licenses and the component catalog.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Users::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Licenses
        manager
            .create_table(
                Table::create()
                    .table(Licenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Licenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Licenses::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Licenses::LicenseKey)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Licenses::Tier).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Licenses::PaymentStatus)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Licenses::StripePaymentIntentId)
                            .string_len(255)
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Licenses::StripeCheckoutSessionId)
                            .string_len(255)
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Licenses::AmountCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Licenses::Currency)
                            .string_len(3)
                            .not_null()
                            .default("usd"),
                    )
                    .col(
                        ColumnDef::new(Licenses::IsLifetime)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Licenses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Licenses::Notes).text().null())
                    .col(timestamp(Licenses::CreatedAt))
                    .col(timestamp(Licenses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_licenses_user")
                            .from(Licenses::Table, Licenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_licenses_user_active")
                    .table(Licenses::Table)
                    .col(Licenses::UserId)
                    .col(Licenses::IsActive)
                    .to_owned(),
            )
            .await?;

        // Categories
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Categories::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Categories::Slug)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Categories::Description).text().null())
                    .col(
                        ColumnDef::new(Categories::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(Categories::CreatedAt))
                    .col(timestamp(Categories::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Subcategories
        manager
            .create_table(
                Table::create()
                    .table(Subcategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subcategories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subcategories::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Subcategories::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Subcategories::Slug)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Subcategories::Description).text().null())
                    .col(
                        ColumnDef::new(Subcategories::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(Subcategories::CreatedAt))
                    .col(timestamp(Subcategories::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subcategories_category")
                            .from(Subcategories::Table, Subcategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Components
        manager
            .create_table(
                Table::create()
                    .table(Components::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Components::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Components::SubcategoryId).uuid().not_null())
                    .col(ColumnDef::new(Components::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Components::Slug)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Components::Description).text().null())
                    .col(
                        ColumnDef::new(Components::IsPremium)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Components::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Components::PreviewUrl).text().null())
                    .col(timestamp(Components::CreatedAt))
                    .col(timestamp(Components::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_components_subcategory")
                            .from(Components::Table, Components::SubcategoryId)
                            .to(Subcategories::Table, Subcategories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_components_subcategory")
                    .table(Components::Table)
                    .col(Components::SubcategoryId)
                    .to_owned(),
            )
            .await?;

        // Component versions
        manager
            .create_table(
                Table::create()
                    .table(ComponentVersions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComponentVersions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ComponentVersions::ComponentId).uuid().not_null())
                    .col(
                        ColumnDef::new(ComponentVersions::Version)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComponentVersions::Code).text().not_null())
                    .col(ColumnDef::new(ComponentVersions::Changelog).text().null())
                    .col(
                        ColumnDef::new(ComponentVersions::IsLatest)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(ComponentVersions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_component_versions_component")
                            .from(ComponentVersions::Table, ComponentVersions::ComponentId)
                            .to(Components::Table, Components::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (component, version)
        manager
            .create_index(
                Index::create()
                    .name("uq_component_versions_version")
                    .table(ComponentVersions::Table)
                    .col(ComponentVersions::ComponentId)
                    .col(ComponentVersions::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComponentVersions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Components::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subcategories::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Licenses::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    Role,
    EmailVerified,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Licenses {
    Table,
    Id,
    UserId,
    LicenseKey,
    Tier,
    PaymentStatus,
    StripePaymentIntentId,
    StripeCheckoutSessionId,
    AmountCents,
    Currency,
    IsLifetime,
    IsActive,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Slug,
    Description,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subcategories {
    Table,
    Id,
    CategoryId,
    Name,
    Slug,
    Description,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Components {
    Table,
    Id,
    SubcategoryId,
    Name,
    Slug,
    Description,
    IsPremium,
    IsPublished,
    PreviewUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ComponentVersions {
    Table,
    Id,
    ComponentId,
    Version,
    Code,
    Changelog,
    IsLatest,
    CreatedAt,
}
