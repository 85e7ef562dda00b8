//! Shared types, errors, and configuration for Ona UI.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token handling
//! - Transactional email delivery
//! - Pagination types for list endpoints

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, Role};
pub use config::{
    AppConfig, BucketSettings, DatabaseConfig, EmailConfig, IdentityConfig, JwtSettings,
    LocalStorageSettings, ServerConfig, StorageSettings, StripeConfig,
};
pub use email::{EmailError, EmailService, OutgoingEmail};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{PageMeta, PageRequest, PageResponse};
