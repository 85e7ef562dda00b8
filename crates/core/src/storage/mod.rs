//! Multi-provider object storage built on Apache OpenDAL.
//!
//! Named disks (`s3`, `s3_private`, `r2`, `r2_private`, `public`, `fs`) each
//! wrap one OpenDAL operator behind [`StorageDriver`]. The
//! [`StorageResolver`] maps the configured [`StorageStrategy`] and a file's
//! visibility onto a disk; in `dual` mode it delegates to the
//! [`DualWriteCoordinator`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ StorageResolver (strategy + is_public -> disk)               │
//! ├───────────────────────────────┬──────────────────────────────┤
//! │ single disk                   │ DualWriteCoordinator         │
//! │                               │ R2 primary -> S3 mirror      │
//! ├───────────────────────────────┴──────────────────────────────┤
//! │ StorageDriver: put / get / exists / delete / url             │
//! │ OpendalDriver: S3, R2 (S3 API), Fs, Memory                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod disk;
mod driver;
mod dual;
mod error;
pub mod naming;
mod resolver;
#[cfg(test)]
pub(crate) mod testing;

pub use config::{BackendConfig, DiskConfig, StorageConfig};
pub use disk::{StorageDisk, StorageStrategy};
pub use driver::{OpendalDriver, StorageDriver};
pub use dual::{DiskHandle, DualWriteCoordinator};
pub use error::StorageError;
pub use naming::{FilenameMode, content_hash, generate_filename};
pub use resolver::{StorageResolver, StoredObject};
