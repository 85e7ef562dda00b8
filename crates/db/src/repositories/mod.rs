//! Repository implementations of the core persistence traits.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod catalog;
pub mod license;
pub mod user;

pub use catalog::CatalogStore;
pub use license::LicenseStore;
pub use user::UserStore;

use ona_core::catalog::CatalogError;
use ona_core::payments::PaymentError;
use sea_orm::{DbErr, SqlErr};
use tracing::error;

/// Map a database error for the payment flow.
pub(crate) fn payment_err(err: DbErr) -> PaymentError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            PaymentError::repository(format!("unique constraint violated: {detail}"))
        }
        _ => {
            error!(error = %err, "payment repository query failed");
            PaymentError::repository(err.to_string())
        }
    }
}

/// Map a database error for catalog operations on `entity`.
pub(crate) fn catalog_err(entity: &'static str) -> impl Fn(DbErr) -> CatalogError {
    move |err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            CatalogError::Conflict(format!("{entity} already exists"))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => CatalogError::HasDependents { entity },
        _ => {
            error!(entity, error = %err, "catalog repository query failed");
            CatalogError::repository(err.to_string())
        }
    }
}
