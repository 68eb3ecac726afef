/// Carfolio API server entry point
///
/// Starts the HTTP server: loads configuration from the environment,
/// connects to PostgreSQL, runs migrations, prepares the image storage
/// directory, and serves the router.

use anyhow::Context;
use carfolio_api::{
    app::{build_router, AppState},
    config::Config,
};
use carfolio_shared::{
    db::{migrations, pool},
    storage::ImageStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carfolio_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Carfolio API server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    let db_config = pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    };
    let db = pool::create_pool(db_config)
        .await
        .context("Failed to create database pool")?;
    tracing::info!("Database pool created");

    // Run migrations
    migrations::run_migrations(&db)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Prepare image storage
    let images = ImageStore::new(&config.storage.root);
    images
        .ensure_root()
        .await
        .context("Failed to create image storage directory")?;
    tracing::info!(root = %config.storage.root.display(), "Image storage ready");

    // Build and serve the router
    let addr = config.bind_address();
    let state = AppState::new(db, config, images);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
