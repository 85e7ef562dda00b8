//! Test doubles for storage drivers.

use async_trait::async_trait;
use bytes::Bytes;

use super::driver::StorageDriver;
use super::error::StorageError;

/// Driver whose every operation fails, standing in for an unreachable bucket.
#[derive(Debug, Default)]
pub struct FailingDriver;

fn unavailable() -> StorageError {
    StorageError::operation("backend unavailable")
}

#[async_trait]
impl StorageDriver for FailingDriver {
    async fn put(&self, _path: &str, _bytes: Bytes, _ct: &str) -> Result<(), StorageError> {
        Err(unavailable())
    }

    async fn get(&self, _path: &str) -> Result<Bytes, StorageError> {
        Err(unavailable())
    }

    async fn exists(&self, _path: &str) -> Result<bool, StorageError> {
        Err(unavailable())
    }

    async fn delete(&self, _path: &str) -> Result<(), StorageError> {
        Err(unavailable())
    }

    async fn url(&self, _path: &str) -> Result<String, StorageError> {
        Err(unavailable())
    }
}
