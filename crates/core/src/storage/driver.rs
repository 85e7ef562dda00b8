//! Driver abstraction over a single disk, backed by Apache OpenDAL.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};

use super::config::{BackendConfig, DiskConfig};
use super::disk::StorageDisk;
use super::error::StorageError;

/// Operations every disk supports.
///
/// The resolver and dual-write coordinator are written against this trait,
/// never against a provider SDK.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Write `bytes` at `path`, replacing any existing object.
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Read the whole object at `path`.
    async fn get(&self, path: &str) -> Result<Bytes, StorageError>;

    /// Whether an object exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Remove the object at `path`. Missing objects are not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// URL a client can fetch the object from.
    async fn url(&self, path: &str) -> Result<String, StorageError>;
}

/// OpenDAL-backed driver for one disk.
pub struct OpendalDriver {
    disk: StorageDisk,
    operator: Operator,
    public_url: Option<String>,
    presign_ttl: Duration,
}

impl std::fmt::Debug for OpendalDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpendalDriver")
            .field("disk", &self.disk)
            .field("public_url", &self.public_url)
            .finish_non_exhaustive()
    }
}

impl OpendalDriver {
    /// Create a driver from disk configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub fn from_config(
        disk: StorageDisk,
        config: &DiskConfig,
        presign_ttl_secs: u64,
    ) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.backend)?;
        Ok(Self {
            disk,
            operator,
            public_url: config.public_url.clone(),
            presign_ttl: Duration::from_secs(presign_ttl_secs),
        })
    }

    /// In-memory driver served under `public_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be initialized.
    pub fn memory(disk: StorageDisk, public_url: impl Into<String>) -> Result<Self, StorageError> {
        Self::from_config(
            disk,
            &DiskConfig::served(BackendConfig::Memory, public_url),
            0,
        )
    }

    /// Disk this driver serves.
    #[must_use]
    pub const fn disk(&self) -> StorageDisk {
        self.disk
    }

    fn create_operator(backend: &BackendConfig) -> Result<Operator, StorageError> {
        let operator = match backend {
            BackendConfig::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let mut builder = services::S3::default()
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            BackendConfig::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            BackendConfig::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };
        Ok(operator)
    }

    fn map_err(path: &str, err: opendal::Error) -> StorageError {
        if err.kind() == ErrorKind::NotFound {
            StorageError::not_found(path)
        } else {
            StorageError::from(err)
        }
    }
}

#[async_trait]
impl StorageDriver for OpendalDriver {
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.operator
            .write_with(path, bytes)
            .content_type(content_type)
            .await
            .map_err(|e| Self::map_err(path, e))?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        let buffer = self
            .operator
            .read(path)
            .await
            .map_err(|e| Self::map_err(path, e))?;
        Ok(buffer.to_bytes())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        match self.operator.stat(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.operator
            .delete(path)
            .await
            .map_err(|e| Self::map_err(path, e))
    }

    async fn url(&self, path: &str) -> Result<String, StorageError> {
        if let Some(base) = &self.public_url {
            return Ok(join_url(base, path));
        }

        let presigned = self
            .operator
            .presign_read(path, self.presign_ttl)
            .await
            .map_err(StorageError::from)?;
        Ok(presigned.uri().to_string())
    }
}

/// Join a base URL and an object key with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
