//! # Carfolio Shared Library
//!
//! This crate contains the types and business logic shared by the Carfolio
//! API server: database models, authentication primitives, the connection
//! pool, and the image file store.
//!
//! ## Module Organization
//!
//! - `models`: Database models (`User`, `Listing`) and their operations
//! - `auth`: Password hashing and JWT session tokens
//! - `db`: Connection pool and migration runner
//! - `storage`: Image file storage under a configurable root directory

pub mod auth;
pub mod db;
pub mod models;
pub mod storage;

/// Current version of the Carfolio shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
