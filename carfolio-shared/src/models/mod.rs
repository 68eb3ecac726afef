/// Database models for Carfolio
///
/// This module contains the two persistent entities and their operations.
/// Relationships are resolved via explicit foreign-key lookups, never lazy
/// traversal.
///
/// # Models
///
/// - `user`: User accounts (the credential store)
/// - `listing`: User-owned car listings with tags and image references
///
/// # Example
///
/// ```no_run
/// use carfolio_shared::models::user::{CreateUser, User};
/// use carfolio_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         name: "John Doe".to_string(),
///         email: "user@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod listing;
pub mod user;
