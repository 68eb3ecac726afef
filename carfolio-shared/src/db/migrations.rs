/// Database migration runner
///
/// Migrations are plain SQL files in the `migrations/` directory at the
/// workspace root, applied at startup via sqlx's migration system.
///
/// # Example
///
/// ```no_run
/// use carfolio_shared::db::migrations::run_migrations;
/// use carfolio_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Migrations that have already been applied are skipped.
///
/// # Errors
///
/// Returns an error if a migration file is malformed or fails to execute
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    // Path is relative to this crate's manifest; migrations live at the
    // workspace root.
    let migrations = sqlx::migrate!("../migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
