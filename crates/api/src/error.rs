//! HTTP error responses.
//!
//! Handlers return `Result<_, ApiError>`. Domain errors convert into
//! [`AppError`] and render as `{ "error": code, "message": msg }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ona_core::catalog::CatalogError;
use ona_core::payments::PaymentError;
use ona_core::storage::StorageError;
use ona_shared::{AppError, JwtError};
use serde_json::json;
use tracing::{error, warn};

/// Wrapper so `AppError` can implement `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side details stay in the logs.
        let message = if status.is_server_error() {
            error!(error = %self.0, code = self.0.error_code(), "request failed");
            "An internal error occurred".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let app = match &err {
            StorageError::NotFound { .. } => AppError::NotFound(err.to_string()),
            e if e.is_validation() => AppError::Validation(err.to_string()),
            StorageError::Configuration(_) | StorageError::DiskNotConfigured(_) => {
                AppError::Internal(err.to_string())
            }
            _ => AppError::ExternalService(err.to_string()),
        };
        Self(app)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let app = match &err {
            CatalogError::Validation(_) => AppError::Validation(err.to_string()),
            CatalogError::NotFound { .. } => AppError::NotFound(err.to_string()),
            CatalogError::Conflict(_) | CatalogError::HasDependents { .. } => {
                AppError::Conflict(err.to_string())
            }
            CatalogError::PremiumRequired(slug) => AppError::PremiumRequired(slug.clone()),
            CatalogError::Repository(_) => AppError::Database(err.to_string()),
        };
        Self(app)
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        let app = match &err {
            PaymentError::Duplicate { .. } => AppError::Conflict(err.to_string()),
            PaymentError::InvalidSignature(_) => {
                warn!(error = %err, "rejected webhook signature");
                AppError::Validation(err.to_string())
            }
            PaymentError::InvalidPayload(_) | PaymentError::MissingCustomerEmail { .. } => {
                AppError::Validation(err.to_string())
            }
            PaymentError::MagicLink(_) | PaymentError::Email(_) => {
                AppError::ExternalService(err.to_string())
            }
            PaymentError::Repository(_) => AppError::Database(err.to_string()),
        };
        Self(app)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self(AppError::Unauthorized("Token has expired".into())),
            JwtError::DecodingError(_) => {
                Self(AppError::Unauthorized("Invalid or malformed token".into()))
            }
            JwtError::EncodingError(e) => Self(AppError::Internal(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ona_core::storage::StorageDisk;
    use rstest::rstest;

    #[rstest]
    #[case(StorageError::EmptyFile, StatusCode::BAD_REQUEST)]
    #[case(StorageError::file_too_large(11, 10), StatusCode::BAD_REQUEST)]
    #[case(StorageError::invalid_mime_type("application/x-msdownload"), StatusCode::BAD_REQUEST)]
    #[case(StorageError::not_found("a.png"), StatusCode::NOT_FOUND)]
    #[case(StorageError::DiskNotConfigured(StorageDisk::R2), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(StorageError::operation("timeout"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_storage_error_status(#[case] err: StorageError, #[case] status: StatusCode) {
        assert_eq!(ApiError::from(err).into_response().status(), status);
    }

    #[rstest]
    #[case(CatalogError::Validation("slug".into()), StatusCode::BAD_REQUEST)]
    #[case(CatalogError::not_found("component", "x"), StatusCode::NOT_FOUND)]
    #[case(CatalogError::slug_taken("category", "x"), StatusCode::CONFLICT)]
    #[case(CatalogError::HasDependents { entity: "category" }, StatusCode::CONFLICT)]
    #[case(CatalogError::PremiumRequired("x".into()), StatusCode::FORBIDDEN)]
    #[case(CatalogError::repository("down"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_catalog_error_status(#[case] err: CatalogError, #[case] status: StatusCode) {
        assert_eq!(ApiError::from(err).into_response().status(), status);
    }

    #[test]
    fn test_premium_required_code() {
        let err = ApiError::from(CatalogError::PremiumRequired("pricing-grid".into()));
        assert_eq!(err.0.error_code(), "PREMIUM_REQUIRED");
    }

    #[test]
    fn test_signature_error_is_bad_request() {
        let err = ApiError::from(PaymentError::InvalidSignature("stale".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
