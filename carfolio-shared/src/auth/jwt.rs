/// Session token generation and validation
///
/// Tokens are signed JWTs (HS256) encoding the user's email and an expiry
/// 30 minutes from issuance. The token is presented as a bearer credential
/// on every authenticated request; the API layer resolves the email claim
/// back to a concrete user.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC-SHA256)
/// - **Expiration**: 30 minutes, embedded in the token and enforced by the
///   verifier
/// - **Validation**: Signature, expiration, issuer, and not-before checks
/// - **Secret Management**: The signing secret is process-wide
///   configuration, loaded once at startup; at least 32 bytes
///
/// # Example
///
/// ```
/// use carfolio_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new("user@example.com");
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, "user@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token lifetime in minutes
pub const TOKEN_TTL_MINUTES: i64 = 30;

/// Issuer claim stamped into every token
const ISSUER: &str = "carfolio";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid token format
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),
}

/// JWT claims structure
///
/// # Claims
///
/// - `sub`: Subject (the user's email, their login identity)
/// - `iss`: Issuer (always "carfolio")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp (30 minutes after issuance)
/// - `nbf`: Not before timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's email address
    pub sub: String,

    /// Issuer - always "carfolio"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates new claims for the given email with the standard 30 minute
    /// expiry
    pub fn new(email: impl Into<String>) -> Self {
        Self::with_expiration(email, Duration::minutes(TOKEN_TTL_MINUTES))
    }

    /// Creates claims with a custom expiration (used by tests to produce
    /// expired tokens)
    pub fn with_expiration(email: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: email.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed session token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts its claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired
/// - Issuer is "carfolio"
/// - Token is not used before its nbf time
/// - Required claims are present
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens and
/// `JwtError::ValidationError` for any other failure (bad signature,
/// malformed token, missing claims, wrong issuer)
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
