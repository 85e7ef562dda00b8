//! Catalog error types.

use thiserror::Error;
use validator::ValidationErrors;

use crate::payments::PaymentError;

/// Catalog operation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Entity not found.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// ID or slug that was looked up.
        key: String,
    },

    /// Slug or version already taken.
    #[error("{0}")]
    Conflict(String),

    /// Entity still has children.
    #[error("cannot delete {entity}, check for dependents")]
    HasDependents {
        /// Entity kind.
        entity: &'static str,
    },

    /// Premium content requested without an active license.
    #[error("an active license is required to access {0}")]
    PremiumRequired(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl CatalogError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Create a slug conflict error.
    #[must_use]
    pub fn slug_taken(entity: &'static str, slug: &str) -> Self {
        Self::Conflict(format!("{entity} with slug '{slug}' already exists"))
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<PaymentError> for CatalogError {
    fn from(err: PaymentError) -> Self {
        Self::Repository(err.to_string())
    }
}
