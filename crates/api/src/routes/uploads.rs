//! Admin upload routes.
//!
//! Files land on the disk chosen by the configured storage strategy. Private
//! files on the local filesystem are served back through `/admin/files`.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use bytes::Bytes;
use ona_core::files::{UploadOptions, UploadedFile};
use ona_core::storage::FilenameMode;
use ona_shared::AppError;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, ApiResult, AppState, middleware::AuthUser};

/// Creates the upload routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/uploads", post(upload).delete(delete_upload))
        .route("/admin/uploads/url", get(upload_url))
        .route("/admin/files/{*path}", get(serve_private_file))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Which disk family a file lives on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Public disk, served directly or via CDN.
    Public,
    /// Private disk, presigned or proxied.
    #[default]
    Private,
}

impl Visibility {
    fn is_public(self) -> bool {
        self == Self::Public
    }
}

impl std::str::FromStr for Visibility {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "public" => Ok(Self::Public),
            "private" | "" => Ok(Self::Private),
            other => Err(validation(format!("unknown visibility: {other}"))),
        }
    }
}

/// Query identifying a stored file.
#[derive(Debug, Deserialize)]
pub struct FileQuery {
    /// Storage key returned by the upload.
    pub path: String,
    /// Disk family.
    #[serde(default)]
    pub visibility: Visibility,
}

/// Resolved URL for a stored file.
#[derive(Debug, Serialize)]
pub struct FileUrlResponse {
    /// Storage key.
    pub path: String,
    /// Public, presigned or proxied URL.
    pub url: String,
}

fn validation(msg: impl Into<String>) -> ApiError {
    ApiError(AppError::Validation(msg.into()))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/admin/uploads`
///
/// Multipart fields: `file` (required), `folder`, `visibility`
/// (`public`|`private`), `naming` (`timestamp`|`hash`).
async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadedFile>)> {
    let mut file: Option<(Bytes, String, String)> = None;
    let mut options = UploadOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let original_name = field.file_name().unwrap_or("file").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| validation(e.body_text()))?;
                file = Some((bytes, original_name, mime_type));
            }
            "folder" => {
                options.folder = field.text().await.map_err(|e| validation(e.body_text()))?;
            }
            "visibility" => {
                let value = field.text().await.map_err(|e| validation(e.body_text()))?;
                options.is_public = value.parse::<Visibility>()?.is_public();
            }
            "naming" => {
                let value = field.text().await.map_err(|e| validation(e.body_text()))?;
                options.naming = value.trim().parse::<FilenameMode>()?;
            }
            _ => {}
        }
    }

    let Some((bytes, original_name, mime_type)) = file else {
        return Err(validation("multipart field 'file' is required"));
    };

    let uploaded = state
        .files
        .upload(bytes, &original_name, &mime_type, &options)
        .await?;

    info!(
        user_id = %auth.user_id(),
        path = %uploaded.path,
        disk = %uploaded.disk,
        "admin upload stored"
    );

    Ok((StatusCode::CREATED, Json(uploaded)))
}

/// GET `/admin/uploads/url?path=...&visibility=...`
async fn upload_url(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> ApiResult<Json<FileUrlResponse>> {
    let url = state
        .files
        .url(&query.path, query.visibility.is_public())
        .await?;

    Ok(Json(FileUrlResponse {
        path: query.path,
        url,
    }))
}

/// DELETE `/admin/uploads?path=...&visibility=...`
async fn delete_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FileQuery>,
) -> ApiResult<StatusCode> {
    state
        .files
        .delete(&query.path, query.visibility.is_public())
        .await?;

    info!(user_id = %auth.user_id(), path = %query.path, "admin upload deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/admin/files/{*path}`
///
/// Streams a private file. This is the URL base of the private local disk.
async fn serve_private_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bytes = state.files.read(&path, false).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream"),
            (header::CACHE_CONTROL, "private, no-store"),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("public", Visibility::Public)]
    #[case("private", Visibility::Private)]
    #[case("", Visibility::Private)]
    fn test_parse_visibility(#[case] input: &str, #[case] expected: Visibility) {
        assert_eq!(input.parse::<Visibility>().unwrap(), expected);
    }

    #[test]
    fn test_parse_visibility_rejects_unknown() {
        assert!("world".parse::<Visibility>().is_err());
    }
}
