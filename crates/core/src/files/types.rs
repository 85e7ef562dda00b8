//! Upload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{FilenameMode, StorageDisk};

/// Caller-supplied upload parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadOptions {
    /// Folder under the disk root, `/`-separated. Empty for the root.
    #[serde(default)]
    pub folder: String,
    /// Whether the file goes to a public disk.
    #[serde(default)]
    pub is_public: bool,
    /// File naming mode.
    #[serde(default)]
    pub naming: FilenameMode,
}

/// A stored upload. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Generated file name.
    pub filename: String,
    /// Name the client sent.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Storage key (`folder/filename`).
    pub path: String,
    /// Resolvable URL.
    pub url: String,
    /// Lowercase hex SHA-256 of the content.
    pub hash: String,
    /// Disk holding the authoritative copy.
    pub disk: StorageDisk,
    /// Whether the file is public.
    pub is_public: bool,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}
