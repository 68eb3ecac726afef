/// Authentication utilities
///
/// This module provides the authentication primitives for Carfolio:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed, time-bounded session tokens
/// - [`middleware`]: Authentication context and error types for Axum
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Tokens**: HS256 signing, 30 minute expiry
/// - **Constant-time Comparison**: Verification uses the hashing scheme's
///   own constant-time verify routine

pub mod jwt;
pub mod middleware;
pub mod password;
