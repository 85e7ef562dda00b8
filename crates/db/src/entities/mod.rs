//! `SeaORM` entity definitions.
//!
//! Enum-like columns (`role`, `tier`, `payment_status`) are stored as
//! lowercase strings and converted at the repository boundary.

pub mod categories;
pub mod component_versions;
pub mod components;
pub mod licenses;
pub mod subcategories;
pub mod users;
