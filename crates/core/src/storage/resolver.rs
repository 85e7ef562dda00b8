//! Routes storage operations to disks according to the configured strategy.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use super::config::StorageConfig;
use super::disk::{StorageDisk, StorageStrategy};
use super::driver::{OpendalDriver, StorageDriver};
use super::dual::{DiskHandle, DualWriteCoordinator};
use super::error::StorageError;

/// Where an object landed and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Disk holding the authoritative copy.
    pub disk: StorageDisk,
    /// Resolvable URL for the object.
    pub url: String,
}

/// Picks a disk per call from the strategy and the file's visibility.
pub struct StorageResolver {
    strategy: StorageStrategy,
    drivers: HashMap<StorageDisk, Arc<dyn StorageDriver>>,
}

impl std::fmt::Debug for StorageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut disks: Vec<_> = self.drivers.keys().map(|d| d.as_str()).collect();
        disks.sort_unstable();
        f.debug_struct("StorageResolver")
            .field("strategy", &self.strategy)
            .field("disks", &disks)
            .finish()
    }
}

impl StorageResolver {
    /// Create a resolver over pre-built drivers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DiskNotConfigured` if the strategy can route to a
    /// disk that has no driver.
    pub fn new(
        strategy: StorageStrategy,
        drivers: HashMap<StorageDisk, Arc<dyn StorageDriver>>,
    ) -> Result<Self, StorageError> {
        if let Some(missing) = strategy
            .required_disks()
            .into_iter()
            .find(|disk| !drivers.contains_key(disk))
        {
            return Err(StorageError::DiskNotConfigured(missing));
        }
        Ok(Self { strategy, drivers })
    }

    /// Build OpenDAL drivers for every configured disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend cannot be initialized or a required
    /// disk is missing.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut drivers: HashMap<StorageDisk, Arc<dyn StorageDriver>> = HashMap::new();
        for (disk, disk_config) in &config.disks {
            let driver = OpendalDriver::from_config(*disk, disk_config, config.presign_ttl_secs)?;
            info!(
                disk = %disk,
                backend = disk_config.backend.name(),
                "storage disk ready"
            );
            drivers.insert(*disk, Arc::new(driver));
        }
        Self::new(config.strategy, drivers)
    }

    /// Configured strategy.
    #[must_use]
    pub const fn strategy(&self) -> StorageStrategy {
        self.strategy
    }

    /// Disk that receives writes for the given visibility.
    #[must_use]
    pub const fn disk_for(&self, is_public: bool) -> StorageDisk {
        self.strategy.primary_disk(is_public)
    }

    fn handle(&self, disk: StorageDisk) -> Result<DiskHandle, StorageError> {
        self.drivers
            .get(&disk)
            .map(|driver| DiskHandle::new(disk, Arc::clone(driver)))
            .ok_or(StorageError::DiskNotConfigured(disk))
    }

    fn dual(&self, is_public: bool) -> Result<Option<DualWriteCoordinator>, StorageError> {
        let Some(secondary) = self.strategy.secondary_disk(is_public) else {
            return Ok(None);
        };
        Ok(Some(DualWriteCoordinator::new(
            self.handle(self.disk_for(is_public))?,
            self.handle(secondary)?,
        )))
    }

    /// Write an object and resolve its URL.
    ///
    /// # Errors
    ///
    /// Outside `dual`, the primary's error propagates without retry.
    pub async fn put(
        &self,
        path: &str,
        bytes: Bytes,
        is_public: bool,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let disk = match self.dual(is_public)? {
            Some(dual) => dual.put(path, bytes, content_type).await?,
            None => {
                let handle = self.handle(self.disk_for(is_public))?;
                handle.driver.put(path, bytes, content_type).await?;
                handle.disk
            }
        };

        let url = self.handle(disk)?.driver.url(path).await?;
        debug!(path, disk = %disk, "object stored");
        Ok(StoredObject { disk, url })
    }

    /// Read an object.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist.
    pub async fn get(&self, path: &str, is_public: bool) -> Result<Bytes, StorageError> {
        match self.dual(is_public)? {
            Some(dual) => dual.get(path).await,
            None => self.handle(self.disk_for(is_public))?.driver.get(path).await,
        }
    }

    /// Check whether an object exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be queried.
    pub async fn exists(&self, path: &str, is_public: bool) -> Result<bool, StorageError> {
        match self.dual(is_public)? {
            Some(dual) => dual.exists(path).await,
            None => {
                self.handle(self.disk_for(is_public))?
                    .driver
                    .exists(path)
                    .await
            }
        }
    }

    /// Resolve a URL for an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk cannot produce a URL.
    pub async fn url(&self, path: &str, is_public: bool) -> Result<String, StorageError> {
        match self.dual(is_public)? {
            Some(dual) => dual.url(path).await,
            None => self.handle(self.disk_for(is_public))?.driver.url(path).await,
        }
    }

    /// Delete an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the primary delete fails.
    pub async fn delete(&self, path: &str, is_public: bool) -> Result<(), StorageError> {
        match self.dual(is_public)? {
            Some(dual) => dual.delete(path).await,
            None => {
                self.handle(self.disk_for(is_public))?
                    .driver
                    .delete(path)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::FailingDriver;

    fn memory_drivers(
        disks: &[StorageDisk],
    ) -> HashMap<StorageDisk, Arc<dyn StorageDriver>> {
        disks
            .iter()
            .map(|disk| {
                let driver: Arc<dyn StorageDriver> = Arc::new(
                    OpendalDriver::memory(*disk, format!("https://{disk}.example.com")).unwrap(),
                );
                (*disk, driver)
            })
            .collect()
    }

    #[test]
    fn test_new_rejects_missing_disk() {
        let drivers = memory_drivers(&[StorageDisk::Public]);
        let err = StorageResolver::new(StorageStrategy::Fs, drivers).unwrap_err();
        assert!(matches!(err, StorageError::DiskNotConfigured(StorageDisk::Fs)));
    }

    #[tokio::test]
    async fn test_fs_routes_by_visibility() {
        let drivers = memory_drivers(&[StorageDisk::Public, StorageDisk::Fs]);
        let resolver = StorageResolver::new(StorageStrategy::Fs, drivers).unwrap();

        let public = resolver
            .put("p.png", Bytes::from_static(b"a"), true, "image/png")
            .await
            .unwrap();
        let private = resolver
            .put("s.zip", Bytes::from_static(b"b"), false, "application/zip")
            .await
            .unwrap();

        assert_eq!(public.disk, StorageDisk::Public);
        assert_eq!(public.url, "https://public.example.com/p.png");
        assert_eq!(private.disk, StorageDisk::Fs);
        assert!(resolver.exists("p.png", true).await.unwrap());
        assert!(!resolver.exists("p.png", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_single_strategy_does_not_retry() {
        let mut drivers = memory_drivers(&[StorageDisk::R2Private]);
        drivers.insert(StorageDisk::R2, Arc::new(FailingDriver));
        let resolver = StorageResolver::new(StorageStrategy::R2, drivers).unwrap();

        let result = resolver
            .put("a.png", Bytes::from_static(b"a"), true, "image/png")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dual_failing_secondary_reports_primary() {
        let mut drivers = memory_drivers(&[StorageDisk::R2, StorageDisk::R2Private]);
        drivers.insert(StorageDisk::S3, Arc::new(FailingDriver));
        drivers.insert(StorageDisk::S3Private, Arc::new(FailingDriver));
        let resolver = StorageResolver::new(StorageStrategy::Dual, drivers).unwrap();

        let stored = resolver
            .put("a.png", Bytes::from_static(b"a"), true, "image/png")
            .await
            .unwrap();

        assert_eq!(stored.disk, StorageDisk::R2);
        assert_eq!(stored.url, "https://r2.example.com/a.png");
    }

    #[tokio::test]
    async fn test_dual_failing_primary_get_reads_secondary() {
        let mut drivers = memory_drivers(&[StorageDisk::S3, StorageDisk::S3Private]);
        drivers.insert(StorageDisk::R2, Arc::new(FailingDriver));
        drivers.insert(StorageDisk::R2Private, Arc::new(FailingDriver));
        let secondary = Arc::clone(&drivers[&StorageDisk::S3]);
        let resolver = StorageResolver::new(StorageStrategy::Dual, drivers).unwrap();

        secondary
            .put("a.png", Bytes::from_static(b"mirror"), "image/png")
            .await
            .unwrap();

        assert_eq!(
            resolver.get("a.png", true).await.unwrap(),
            Bytes::from_static(b"mirror")
        );
    }

    #[tokio::test]
    async fn test_dual_failing_primary_put_reports_secondary() {
        let mut drivers = memory_drivers(&[StorageDisk::S3, StorageDisk::S3Private]);
        drivers.insert(StorageDisk::R2, Arc::new(FailingDriver));
        drivers.insert(StorageDisk::R2Private, Arc::new(FailingDriver));
        let resolver = StorageResolver::new(StorageStrategy::Dual, drivers).unwrap();

        let stored = resolver
            .put("a.zip", Bytes::from_static(b"a"), false, "application/zip")
            .await
            .unwrap();

        assert_eq!(stored.disk, StorageDisk::S3Private);
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let drivers = memory_drivers(&[StorageDisk::S3, StorageDisk::S3Private]);
        let resolver = StorageResolver::new(StorageStrategy::S3, drivers).unwrap();

        resolver
            .put("a.png", Bytes::from_static(b"a"), true, "image/png")
            .await
            .unwrap();
        resolver.delete("a.png", true).await.unwrap();

        assert!(!resolver.exists("a.png", true).await.unwrap());
    }
}
