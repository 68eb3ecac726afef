/// Authentication context and errors for Axum middleware
///
/// The API server's auth layer validates the bearer token from the
/// Authorization header, resolves the email claim to a concrete user, and
/// inserts an [`AuthContext`] into request extensions. Handlers extract it
/// with Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use carfolio_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {} ({})", auth.user_id, auth.email)
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Authentication context added to request extensions
///
/// Present on every request that passed the auth layer. Identifies the
/// requesting user; all listing operations are scoped to `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Email address the token was issued for
    pub email: String,
}

impl AuthContext {
    /// Creates an auth context for a resolved user
    pub fn new(user_id: i64, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}

/// Error type for the authentication layer
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token was valid but its identity resolves to no user
    UnknownUser,

    /// Database error during user resolution
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing authorization header".to_string(),
            ),
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            AuthError::UnknownUser => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "User not found".to_string(),
            ),
            AuthError::DatabaseError(msg) => {
                tracing::error!("Auth database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": error_code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_new() {
        let ctx = AuthContext::new(42, "user@example.com");
        assert_eq!(ctx.user_id, 42);
        assert_eq!(ctx.email, "user@example.com");
    }

    #[test]
    fn test_auth_error_status_codes() {
        let resp = AuthError::MissingCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AuthError::InvalidFormat("Expected Bearer token".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AuthError::InvalidToken("bad signature".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AuthError::UnknownUser.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    async fn error_code(err: AuthError) -> String {
        let resp = err.into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_auth_error_codes_match_variants() {
        assert_eq!(error_code(AuthError::MissingCredentials).await, "unauthorized");
        assert_eq!(
            error_code(AuthError::InvalidFormat("Expected Bearer token".to_string())).await,
            "bad_request"
        );
        assert_eq!(
            error_code(AuthError::InvalidToken("bad signature".to_string())).await,
            "unauthorized"
        );
        assert_eq!(error_code(AuthError::UnknownUser).await, "unauthorized");
        assert_eq!(
            error_code(AuthError::DatabaseError("pool timeout".to_string())).await,
            "internal_error"
        );
    }
}
