//! Core business logic for Ona UI.
//!
//! This crate contains domain logic with no web or database dependencies.
//! Persistence and outbound providers are reached through traits that the
//! `db` and `api` crates implement.
//!
//! # Modules
//!
//! - `storage` - Disk routing across S3, R2 and the local filesystem
//! - `files` - Upload validation, naming and retrieval
//! - `payments` - Checkout webhook orchestration and license provisioning
//! - `catalog` - Categories, components and versioned component code

pub mod catalog;
pub mod files;
pub mod payments;
pub mod storage;
