//! Storage configuration types.

use std::collections::HashMap;
use std::path::PathBuf;

use ona_shared::config::{BucketSettings, StorageSettings};
use serde::{Deserialize, Serialize};

use super::disk::{StorageDisk, StorageStrategy};
use super::error::StorageError;

/// Backend behind a single disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// S3-compatible storage: AWS S3, Cloudflare R2.
    S3 {
        /// Endpoint URL; `None` uses the AWS default for the region.
        endpoint: Option<String>,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region (`auto` for R2).
        region: String,
    },
    /// Local filesystem.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory, lost on restart.
    Memory,
}

impl BackendConfig {
    /// Create S3-compatible backend.
    #[must_use]
    pub fn s3(
        endpoint: Option<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint,
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem backend.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Backend kind for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "fs",
            Self::Memory => "memory",
        }
    }
}

/// Configuration of one named disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskConfig {
    /// Where the bytes live.
    pub backend: BackendConfig,
    /// Base URL objects are served from. `None` means URLs are presigned.
    pub public_url: Option<String>,
}

impl DiskConfig {
    /// Disk whose objects are served under a fixed base URL.
    #[must_use]
    pub fn served(backend: BackendConfig, public_url: impl Into<String>) -> Self {
        Self {
            backend,
            public_url: Some(public_url.into()),
        }
    }

    /// Disk whose objects are only reachable through presigned URLs.
    #[must_use]
    pub const fn presigned(backend: BackendConfig) -> Self {
        Self {
            backend,
            public_url: None,
        }
    }
}

/// Storage configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Write strategy.
    pub strategy: StorageStrategy,
    /// Disk definitions.
    pub disks: HashMap<StorageDisk, DiskConfig>,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Presigned download URL TTL in seconds.
    pub presign_ttl_secs: u64,
    /// Allowed MIME types for upload.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    /// Default presign TTL: 1 hour.
    pub const DEFAULT_PRESIGN_TTL: u64 = 3600;

    /// Create a storage config with no disks and default limits.
    #[must_use]
    pub fn new(strategy: StorageStrategy) -> Self {
        Self {
            strategy,
            disks: HashMap::new(),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            presign_ttl_secs: Self::DEFAULT_PRESIGN_TTL,
            allowed_mime_types: Self::default_mime_types(),
        }
    }

    /// Register a disk.
    #[must_use]
    pub fn with_disk(mut self, disk: StorageDisk, config: DiskConfig) -> Self {
        self.disks.insert(disk, config);
        self
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set presigned URL TTL.
    #[must_use]
    pub fn with_presign_ttl(mut self, secs: u64) -> Self {
        self.presign_ttl_secs = secs;
        self
    }

    /// Set allowed MIME types.
    #[must_use]
    pub fn with_allowed_mime_types(mut self, types: Vec<String>) -> Self {
        self.allowed_mime_types = types;
        self
    }

    /// Default allowed MIME types for marketplace assets.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        [
            // Images
            "image/png",
            "image/jpeg",
            "image/gif",
            "image/webp",
            "image/avif",
            "image/svg+xml",
            // Previews
            "video/mp4",
            "video/webm",
            // Source bundles
            "application/zip",
            "application/json",
            "text/plain",
            "text/css",
            "text/javascript",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|t| t == mime_type)
    }

    /// Builds the disk table the configured strategy needs.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` for an unknown strategy or a
    /// bucket disk with missing credentials.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let strategy: StorageStrategy = settings.provider.parse()?;
        let mut config = Self::new(strategy).with_max_file_size(settings.max_file_size);

        for disk in strategy.required_disks() {
            let disk_config = match disk {
                StorageDisk::Public => DiskConfig::served(
                    BackendConfig::local_fs(&settings.local.public_root),
                    &settings.local.public_url,
                ),
                StorageDisk::Fs => DiskConfig::served(
                    BackendConfig::local_fs(&settings.local.private_root),
                    &settings.local.private_url,
                ),
                StorageDisk::S3 => bucket_disk(&settings.s3, "s3", "us-east-1", true)?,
                StorageDisk::S3Private => bucket_disk(&settings.s3, "s3", "us-east-1", false)?,
                StorageDisk::R2 => bucket_disk(&settings.r2, "r2", "auto", true)?,
                StorageDisk::R2Private => bucket_disk(&settings.r2, "r2", "auto", false)?,
            };
            config.disks.insert(disk, disk_config);
        }

        Ok(config)
    }
}

fn bucket_disk(
    bucket: &BucketSettings,
    label: &str,
    default_region: &str,
    public: bool,
) -> Result<DiskConfig, StorageError> {
    let missing = |field: &str| StorageError::configuration(format!("{label}: missing {field}"));

    let name = if public {
        bucket.bucket.as_ref().ok_or_else(|| missing("bucket"))?
    } else {
        bucket
            .private_bucket
            .as_ref()
            .ok_or_else(|| missing("private_bucket"))?
    };
    let access_key_id = bucket
        .access_key_id
        .as_ref()
        .ok_or_else(|| missing("access_key_id"))?;
    let secret_access_key = bucket
        .secret_access_key
        .as_ref()
        .ok_or_else(|| missing("secret_access_key"))?;
    let region = bucket.region.as_deref().unwrap_or(default_region);

    let backend = BackendConfig::s3(
        bucket.endpoint.clone(),
        name,
        access_key_id,
        secret_access_key,
        region,
    );

    Ok(match (&bucket.public_url, public) {
        (Some(url), true) => DiskConfig::served(backend, url),
        _ => DiskConfig::presigned(backend),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r2_settings() -> BucketSettings {
        BucketSettings {
            endpoint: Some("https://account.r2.cloudflarestorage.com".to_string()),
            region: None,
            bucket: Some("ona-assets".to_string()),
            private_bucket: Some("ona-private".to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            public_url: Some("https://cdn.ona-ui.com".to_string()),
        }
    }

    #[test]
    fn test_defaults() {
        let config = StorageConfig::new(StorageStrategy::Fs);
        assert_eq!(config.max_file_size, StorageConfig::DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.presign_ttl_secs, StorageConfig::DEFAULT_PRESIGN_TTL);
        assert!(config.disks.is_empty());
    }

    #[test]
    fn test_mime_type_validation() {
        let config = StorageConfig::new(StorageStrategy::Fs);
        assert!(config.is_mime_type_allowed("image/png"));
        assert!(config.is_mime_type_allowed("application/zip"));
        assert!(!config.is_mime_type_allowed("application/x-executable"));
        assert!(!config.is_mime_type_allowed("text/html"));
    }

    #[test]
    fn test_from_settings_fs() {
        let settings = StorageSettings::default();
        let config = StorageConfig::from_settings(&settings).unwrap();

        assert_eq!(config.strategy, StorageStrategy::Fs);
        assert_eq!(config.disks.len(), 2);
        assert_eq!(
            config.disks[&StorageDisk::Public].public_url.as_deref(),
            Some("/uploads")
        );
    }

    #[test]
    fn test_from_settings_r2_uses_cdn_for_public_bucket_only() {
        let settings = StorageSettings {
            provider: "r2".to_string(),
            r2: r2_settings(),
            ..StorageSettings::default()
        };
        let config = StorageConfig::from_settings(&settings).unwrap();

        assert_eq!(
            config.disks[&StorageDisk::R2].public_url.as_deref(),
            Some("https://cdn.ona-ui.com")
        );
        assert!(config.disks[&StorageDisk::R2Private].public_url.is_none());
        match &config.disks[&StorageDisk::R2].backend {
            BackendConfig::S3 { region, bucket, .. } => {
                assert_eq!(region, "auto");
                assert_eq!(bucket, "ona-assets");
            }
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[test]
    fn test_from_settings_dual_requires_s3() {
        let settings = StorageSettings {
            provider: "dual".to_string(),
            r2: r2_settings(),
            ..StorageSettings::default()
        };
        let err = StorageConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(msg) if msg.starts_with("s3")));
    }

    #[test]
    fn test_from_settings_rejects_unknown_provider() {
        let settings = StorageSettings {
            provider: "gcs".to_string(),
            ..StorageSettings::default()
        };
        assert!(StorageConfig::from_settings(&settings).is_err());
    }
}
