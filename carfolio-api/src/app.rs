/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use carfolio_api::{app::AppState, config::Config};
/// use carfolio_shared::storage::ImageStore;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let images = ImageStore::new(&config.storage.root);
/// let state = AppState::new(pool, config, images);
/// let app = carfolio_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use carfolio_shared::{
    auth::{
        jwt,
        middleware::{AuthContext, AuthError},
    },
    models::user::User,
    storage::ImageStore,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Image file store
    pub images: ImageStore,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, images: ImageStore) -> Self {
        Self {
            db,
            config: Arc::new(config),
            images,
        }
    }

    /// Gets the token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                 # Health check (public)
/// ├── /signup                 # Register (public)
/// ├── /token                  # Login, issues bearer token (public)
/// ├── /cars                   # Listing CRUD (authenticated)
/// │   ├── POST   /            # Create listing (multipart)
/// │   ├── GET    /            # List caller's listings
/// │   ├── GET    /search      # Keyword search, owner-scoped
/// │   ├── GET    /:id         # Fetch one listing
/// │   ├── PUT    /:id         # Partial update (multipart)
/// │   └── DELETE /:id         # Delete listing + image files
/// └── /images/*               # Static serving of the storage root
/// ```
///
/// # Middleware Stack
///
/// 1. Request tracing (tower-http TraceLayer)
/// 2. CORS, permissive (the service fronts a browser client)
/// 3. Bearer token authentication on the /cars subtree
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes: health check, signup, login
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::auth::signup))
        .route("/token", post(routes::auth::token));

    // Listing routes (require bearer token authentication)
    let car_routes = Router::new()
        .route("/", post(routes::listings::create_listing))
        .route("/", get(routes::listings::list_listings))
        .route("/search", get(routes::listings::search_listings))
        .route("/:id", get(routes::listings::get_listing))
        .route("/:id", put(routes::listings::update_listing))
        .route("/:id", delete(routes::listings::delete_listing))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    // Stored images are served read-only from the storage root
    let images_service = ServeDir::new(state.images.root());

    Router::new()
        .merge(public_routes)
        .nest("/cars", car_routes)
        .nest_service("/images", images_service)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bearer token authentication middleware layer
///
/// Extracts and validates the token from the Authorization header, then
/// resolves the email claim to a concrete user and injects an
/// [`AuthContext`] into request extensions. A valid token whose identity
/// no longer exists is rejected the same as an invalid token.
async fn bearer_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    // Validate signature, expiry, and claims
    let claims = jwt::validate_token(token, state.jwt_secret())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    // Resolve the email claim to a concrete user
    let user = User::find_by_email(&state.db, &claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    req.extensions_mut()
        .insert(AuthContext::new(user.id, user.email));

    Ok(next.run(req).await)
}
