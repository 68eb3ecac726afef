/// Carfolio API server library
///
/// HTTP API for a car-listing inventory: account signup and login with
/// bearer tokens, and per-user CRUD over listings with tags and image
/// uploads.
///
/// # Modules
///
/// - `app`: Application state and router builder
/// - `config`: Environment-based configuration
/// - `error`: API error types and HTTP response mapping
/// - `routes`: Route handlers (health, auth, listings)

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
