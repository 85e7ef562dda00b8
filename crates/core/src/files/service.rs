//! File upload service.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::info;

use super::types::{UploadOptions, UploadedFile};
use crate::storage::{
    FilenameMode, StorageConfig, StorageError, StorageResolver, content_hash, generate_filename,
};

/// Validates, names and stores uploaded assets.
#[derive(Debug)]
pub struct FileService {
    resolver: Arc<StorageResolver>,
    max_file_size: u64,
    allowed_mime_types: Vec<String>,
}

impl FileService {
    /// Create a file service using the limits from `config`.
    #[must_use]
    pub fn new(resolver: Arc<StorageResolver>, config: &StorageConfig) -> Self {
        Self {
            resolver,
            max_file_size: config.max_file_size,
            allowed_mime_types: config.allowed_mime_types.clone(),
        }
    }

    /// Underlying resolver.
    #[must_use]
    pub fn resolver(&self) -> &StorageResolver {
        &self.resolver
    }

    /// Validate an upload against size and MIME constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is empty, too large or of a disallowed type.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size == 0 {
            return Err(StorageError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(StorageError::file_too_large(size, self.max_file_size));
        }

        if !self.allowed_mime_types.iter().any(|t| t == content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Store an upload and describe where it landed.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the storage error if the
    /// write fails.
    pub async fn upload(
        &self,
        bytes: Bytes,
        original_name: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> Result<UploadedFile, StorageError> {
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        self.validate_upload(mime_type, size)?;

        let hash = content_hash(&bytes);
        if options.naming == FilenameMode::Hash
            && let Some(existing) = self.find_file_by_hash(&hash).await
        {
            return Ok(existing);
        }

        let filename = generate_filename(original_name, options.naming, &hash);
        let path = storage_path(&options.folder, &filename)?;

        let stored = self
            .resolver
            .put(&path, bytes, options.is_public, mime_type)
            .await?;

        info!(
            path = %path,
            disk = %stored.disk,
            size,
            is_public = options.is_public,
            "file uploaded"
        );

        Ok(UploadedFile {
            filename,
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            size,
            path,
            url: stored.url,
            hash,
            disk: stored.disk,
            is_public: options.is_public,
            uploaded_at: Utc::now(),
        })
    }

    /// Lookup of a previous upload by content hash.
    ///
    /// Uploads are not indexed, so this never finds anything and identical
    /// content is stored again.
    pub async fn find_file_by_hash(&self, _hash: &str) -> Option<UploadedFile> {
        None
    }

    /// Read a stored file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the file does not exist.
    pub async fn read(&self, path: &str, is_public: bool) -> Result<Bytes, StorageError> {
        validate_key(path)?;
        self.resolver.get(path, is_public).await
    }

    /// Resolve a URL for a stored file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the file does not exist.
    pub async fn url(&self, path: &str, is_public: bool) -> Result<String, StorageError> {
        validate_key(path)?;
        if !self.resolver.exists(path, is_public).await? {
            return Err(StorageError::not_found(path));
        }
        self.resolver.url(path, is_public).await
    }

    /// Delete a stored file.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the delete fails.
    pub async fn delete(&self, path: &str, is_public: bool) -> Result<(), StorageError> {
        validate_key(path)?;
        self.resolver.delete(path, is_public).await?;
        info!(path, is_public, "file deleted");
        Ok(())
    }
}

/// Join a sanitized folder and a generated file name.
fn storage_path(folder: &str, filename: &str) -> Result<String, StorageError> {
    let mut segments = Vec::new();
    for segment in folder.split('/').filter(|s| !s.is_empty()) {
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(StorageError::InvalidKey(format!(
                "invalid folder segment '{segment}'"
            )));
        }
        segments.push(segment);
    }
    segments.push(filename);
    Ok(segments.join("/"))
}

/// Reject keys that escape the disk root.
fn validate_key(path: &str) -> Result<(), StorageError> {
    if path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|s| s.is_empty() || s == "." || s == "..")
    {
        return Err(StorageError::InvalidKey(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::storage::{OpendalDriver, StorageDisk, StorageDriver, StorageStrategy};

    fn fs_service(max: u64) -> FileService {
        let mut drivers: HashMap<StorageDisk, Arc<dyn StorageDriver>> = HashMap::new();
        drivers.insert(
            StorageDisk::Public,
            Arc::new(OpendalDriver::memory(StorageDisk::Public, "/uploads").unwrap()),
        );
        drivers.insert(
            StorageDisk::Fs,
            Arc::new(OpendalDriver::memory(StorageDisk::Fs, "/api/v1/admin/files").unwrap()),
        );
        let resolver = StorageResolver::new(StorageStrategy::Fs, drivers).unwrap();
        let config = StorageConfig::new(StorageStrategy::Fs).with_max_file_size(max);
        FileService::new(Arc::new(resolver), &config)
    }

    fn hash_options(folder: &str, is_public: bool) -> UploadOptions {
        UploadOptions {
            folder: folder.to_string(),
            is_public,
            naming: FilenameMode::Hash,
        }
    }

    #[tokio::test]
    async fn test_upload_public_file() {
        let service = fs_service(1024);
        let file = service
            .upload(
                Bytes::from_static(b"png-bytes"),
                "Hero Shot.PNG",
                "image/png",
                &hash_options("previews/cards", true),
            )
            .await
            .unwrap();

        assert_eq!(file.disk, StorageDisk::Public);
        assert_eq!(file.hash, content_hash(b"png-bytes"));
        assert_eq!(
            file.path,
            format!("previews/cards/hero-shot-{}.png", &file.hash[..16])
        );
        assert_eq!(file.url, format!("/uploads/{}", file.path));
        assert_eq!(file.size, 9);
        assert_eq!(file.original_name, "Hero Shot.PNG");
        assert!(file.is_public);

        let bytes = service.read(&file.path, true).await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"png-bytes"));
    }

    #[tokio::test]
    async fn test_identical_content_same_hash_name() {
        let service = fs_service(1024);
        let options = hash_options("", false);
        let a = service
            .upload(Bytes::from_static(b"same"), "a.zip", "application/zip", &options)
            .await
            .unwrap();
        let b = service
            .upload(Bytes::from_static(b"same"), "a.zip", "application/zip", &options)
            .await
            .unwrap();

        assert_eq!(a.path, b.path);
        assert_eq!(a.disk, StorageDisk::Fs);
    }

    #[tokio::test]
    async fn test_find_file_by_hash_never_matches() {
        let service = fs_service(1024);
        let file = service
            .upload(
                Bytes::from_static(b"x"),
                "x.txt",
                "text/plain",
                &UploadOptions::default(),
            )
            .await
            .unwrap();

        assert!(service.find_file_by_hash(&file.hash).await.is_none());
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized() {
        let service = fs_service(4);
        let err = service
            .upload(
                Bytes::from_static(b"too big"),
                "a.png",
                "image/png",
                &UploadOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { size: 7, max: 4 }));
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_mime() {
        let service = fs_service(1024);
        let err = service
            .upload(
                Bytes::from_static(b"MZ"),
                "a.exe",
                "application/x-msdownload",
                &UploadOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_and_traversal() {
        let service = fs_service(1024);
        let err = service
            .upload(Bytes::new(), "a.png", "image/png", &UploadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::EmptyFile));

        let err = service
            .upload(
                Bytes::from_static(b"a"),
                "a.png",
                "image/png",
                &hash_options("../etc", true),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_url_and_delete() {
        let service = fs_service(1024);
        let file = service
            .upload(
                Bytes::from_static(b"code"),
                "card.zip",
                "application/zip",
                &hash_options("bundles", false),
            )
            .await
            .unwrap();

        assert_eq!(
            service.url(&file.path, false).await.unwrap(),
            format!("/api/v1/admin/files/{}", file.path)
        );

        service.delete(&file.path, false).await.unwrap();
        assert!(matches!(
            service.url(&file.path, false).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("a/b.png").is_ok());
        assert!(validate_key("/a.png").is_err());
        assert!(validate_key("a/../b.png").is_err());
        assert!(validate_key("a//b.png").is_err());
        assert!(validate_key("").is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::storage::StorageStrategy;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_file_size_validation(max_size in 1u64..10_000_000, file_size in 1u64..20_000_000) {
            let config = StorageConfig::new(StorageStrategy::Fs).with_max_file_size(max_size);
            let service = FileService::new(Arc::new(fs_resolver()), &config);
            let result = service.validate_upload("image/png", file_size);

            if file_size <= max_size {
                prop_assert!(result.is_ok());
            } else {
                let is_too_large = matches!(result, Err(StorageError::FileTooLarge { .. }));
                prop_assert!(is_too_large);
            }
        }

        #[test]
        fn prop_mime_type_validation(mime_type in "[a-z]+/[a-z0-9+-]+") {
            let config = StorageConfig::new(StorageStrategy::Fs);
            let service = FileService::new(Arc::new(fs_resolver()), &config);
            let result = service.validate_upload(&mime_type, 16);

            if config.is_mime_type_allowed(&mime_type) {
                prop_assert!(result.is_ok());
            } else {
                let is_invalid = matches!(result, Err(StorageError::InvalidMimeType { .. }));
                prop_assert!(is_invalid);
            }
        }

        #[test]
        fn prop_storage_path_stays_relative(
            folder in "[a-z0-9_-]{1,12}(/[a-z0-9_-]{1,12}){0,3}",
            name in "[a-z0-9-]{1,20}\\.png",
        ) {
            let path = storage_path(&folder, &name).unwrap();
            prop_assert!(validate_key(&path).is_ok());
            prop_assert!(path.ends_with(&name));
        }
    }

    fn fs_resolver() -> StorageResolver {
        use crate::storage::{OpendalDriver, StorageDisk, StorageDriver};

        let drivers: std::collections::HashMap<StorageDisk, Arc<dyn StorageDriver>> =
            [StorageDisk::Public, StorageDisk::Fs]
                .into_iter()
                .map(|disk| {
                    let driver: Arc<dyn StorageDriver> =
                        Arc::new(OpendalDriver::memory(disk, "/files").unwrap());
                    (disk, driver)
                })
                .collect();
        StorageResolver::new(StorageStrategy::Fs, drivers).unwrap()
    }
}
