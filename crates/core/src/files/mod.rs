//! Asset uploads on top of the storage resolver.
//!
//! Validates size and MIME type, names the file, writes it through the
//! configured strategy and returns an [`UploadedFile`] record.

mod service;
mod types;

pub use service::FileService;
pub use types::{UploadOptions, UploadedFile};
