/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Account endpoints (signup, token issuance)
/// - `listings`: Car listing CRUD and search

pub mod auth;
pub mod health;
pub mod listings;
