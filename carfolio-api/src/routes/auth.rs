/// Account endpoints
///
/// # Endpoints
///
/// - `POST /signup` - Register a new user
/// - `POST /token` - Exchange credentials for a bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Form, Json};
use carfolio_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Email address, the login identity
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password (stored only as a salted hash)
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Signup response
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    /// Confirmation message
    pub message: String,
}

/// Token request (OAuth2-style password form)
///
/// The `username` field carries the email address.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Email address
    pub username: String,

    /// Plaintext password
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed bearer token, valid for 30 minutes
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /signup
/// Content-Type: application/json
///
/// {
///   "name": "John Doe",
///   "email": "user@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    // Validate request
    req.validate().map_err(|e| {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    })?;

    // Reject duplicate emails; the unique constraint is the backstop for
    // concurrent signups
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = password::hash_password(&req.password)?;

    User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    Ok(Json(SignupResponse {
        message: "User created successfully".to_string(),
    }))
}

/// Issue a bearer token for valid credentials
///
/// # Endpoint
///
/// ```text
/// POST /token
/// Content-Type: application/x-www-form-urlencoded
///
/// username=user@example.com&password=secret
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "token_type": "bearer"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password; the two cases
///   produce the same message
pub async fn token(
    State(state): State<AppState>,
    Form(req): Form<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_email(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let claims = jwt::Claims::new(&user.email);
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
