//! Primary/secondary write mirroring for the `dual` strategy.
//!
//! The primary is the source of truth. Secondary failures are logged and
//! swallowed; the two disks may diverge and nothing reconciles them.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use super::disk::StorageDisk;
use super::driver::StorageDriver;
use super::error::StorageError;

/// A disk name paired with its driver.
#[derive(Clone)]
pub struct DiskHandle {
    /// Disk name.
    pub disk: StorageDisk,
    /// Driver serving the disk.
    pub driver: Arc<dyn StorageDriver>,
}

impl DiskHandle {
    /// Pair a disk with its driver.
    #[must_use]
    pub fn new(disk: StorageDisk, driver: Arc<dyn StorageDriver>) -> Self {
        Self { disk, driver }
    }
}

impl std::fmt::Debug for DiskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DiskHandle").field(&self.disk).finish()
    }
}

/// Writes to a primary disk and mirrors to a secondary one.
#[derive(Debug, Clone)]
pub struct DualWriteCoordinator {
    primary: DiskHandle,
    secondary: DiskHandle,
}

impl DualWriteCoordinator {
    /// Create a coordinator.
    #[must_use]
    pub const fn new(primary: DiskHandle, secondary: DiskHandle) -> Self {
        Self { primary, secondary }
    }

    /// Primary disk name.
    #[must_use]
    pub const fn primary_disk(&self) -> StorageDisk {
        self.primary.disk
    }

    /// Secondary disk name.
    #[must_use]
    pub const fn secondary_disk(&self) -> StorageDisk {
        self.secondary.disk
    }

    /// Write to the primary, then mirror to the secondary.
    ///
    /// Returns the disk holding the authoritative copy: the primary, or the
    /// secondary when the primary write failed and the fallback succeeded.
    ///
    /// # Errors
    ///
    /// Returns the secondary's error when both writes fail.
    pub async fn put(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<StorageDisk, StorageError> {
        match self
            .primary
            .driver
            .put(path, bytes.clone(), content_type)
            .await
        {
            Ok(()) => {
                if let Err(e) = self.secondary.driver.put(path, bytes, content_type).await {
                    warn!(
                        path,
                        disk = %self.secondary.disk,
                        error = %e,
                        "secondary write failed, copies diverge"
                    );
                } else {
                    debug!(path, disk = %self.secondary.disk, "secondary write ok");
                }
                Ok(self.primary.disk)
            }
            Err(primary_err) => {
                warn!(
                    path,
                    disk = %self.primary.disk,
                    error = %primary_err,
                    "primary write failed, falling back to secondary"
                );
                self.secondary.driver.put(path, bytes, content_type).await?;
                Ok(self.secondary.disk)
            }
        }
    }

    /// Read from the primary, falling back to the secondary on any error.
    ///
    /// # Errors
    ///
    /// Returns the secondary's error when both reads fail.
    pub async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        match self.primary.driver.get(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                debug!(path, error = %e, "primary read failed, trying secondary");
                self.secondary.driver.get(path).await
            }
        }
    }

    /// True as soon as either disk reports the object.
    ///
    /// # Errors
    ///
    /// Returns the secondary's error when the primary does not have the
    /// object and the secondary cannot be checked.
    pub async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        if matches!(self.primary.driver.exists(path).await, Ok(true)) {
            return Ok(true);
        }
        self.secondary.driver.exists(path).await
    }

    /// Delete from both disks.
    ///
    /// # Errors
    ///
    /// Returns the primary's error. Secondary failures are logged only.
    pub async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let primary = self.primary.driver.delete(path).await;
        if let Err(e) = self.secondary.driver.delete(path).await {
            warn!(path, disk = %self.secondary.disk, error = %e, "secondary delete failed");
        }
        primary
    }

    /// URL on the disk that actually has the object, primary first.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen disk cannot produce a URL.
    pub async fn url(&self, path: &str) -> Result<String, StorageError> {
        if matches!(self.primary.driver.exists(path).await, Ok(true)) {
            return self.primary.driver.url(path).await;
        }
        if matches!(self.secondary.driver.exists(path).await, Ok(true)) {
            return self.secondary.driver.url(path).await;
        }
        self.primary.driver.url(path).await
    }
}
