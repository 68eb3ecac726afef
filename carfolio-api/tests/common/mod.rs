/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation and token generation
/// - Multipart form body construction
///
/// Integration tests need a running PostgreSQL instance; when
/// `DATABASE_URL` is unset, [`TestContext::new`] returns `None` and each
/// test returns early.

use carfolio_api::app::{build_router, AppState};
use carfolio_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, StorageConfig};
use carfolio_shared::auth::jwt::{create_token, Claims};
use carfolio_shared::auth::password::hash_password;
use carfolio_shared::models::user::{CreateUser, User};
use carfolio_shared::storage::ImageStore;
use sqlx::PgPool;
use uuid::Uuid;

/// Password used for every test user
pub const TEST_PASSWORD: &str = "test-password";

const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub images: ImageStore,
    pub user: User,
    pub jwt_token: String,
    jwt_secret: String,
    // Keeps the image directory alive for the test's duration
    _storage_dir: tempfile::TempDir,
}

impl TestContext {
    /// Creates a new test context with a fresh user and image directory
    ///
    /// Returns `None` when `DATABASE_URL` is unset so the suite can run
    /// without a database.
    pub async fn new() -> Option<Self> {
        let database_url = std::env::var("DATABASE_URL").ok()?;

        let db = PgPool::connect(&database_url).await.unwrap();

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await.unwrap();

        // Each context gets its own image directory
        let storage_dir = tempfile::tempdir().unwrap();

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            storage: StorageConfig {
                root: storage_dir.path().to_path_buf(),
            },
        };

        // Create test user
        let user = User::create(
            &db,
            CreateUser {
                name: "Test User".to_string(),
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: hash_password(TEST_PASSWORD).unwrap(),
            },
        )
        .await
        .unwrap();

        // Generate bearer token
        let claims = Claims::new(&user.email);
        let jwt_token = create_token(&claims, &config.jwt.secret).unwrap();

        // Build app
        let images = ImageStore::new(&config.storage.root);
        images.ensure_root().await.unwrap();
        let state = AppState::new(db.clone(), config, images.clone());
        let app = build_router(state);

        Some(TestContext {
            db,
            app,
            images,
            user,
            jwt_token,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            _storage_dir: storage_dir,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates a second user with its own bearer token
    pub async fn create_other_user(&self) -> (User, String) {
        let user = User::create(
            &self.db,
            CreateUser {
                name: "Other User".to_string(),
                email: format!("other-{}@example.com", Uuid::new_v4()),
                password_hash: hash_password(TEST_PASSWORD).unwrap(),
            },
        )
        .await
        .unwrap();

        let claims = Claims::new(&user.email);
        let token = create_token(&claims, &self.jwt_secret).unwrap();

        (user, format!("Bearer {}", token))
    }

    /// Cleans up test data (listings cascade from the user)
    pub async fn cleanup(&self) {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await
            .unwrap();
    }
}

/// Boundary string for test multipart bodies
pub const BOUNDARY: &str = "------------------------carfolio-test";

/// Content-Type header value for test multipart bodies
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Builds a multipart/form-data body from text fields plus `image_count`
/// synthetic image file parts
pub fn multipart_body(text_fields: &[(&str, &str)], image_count: usize) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in text_fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for i in 0..image_count {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"images\"; filename=\"car{}.jpg\"\r\n",
                i
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(format!("fake-jpeg-bytes-{}", i).as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Reads a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
