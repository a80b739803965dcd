/// Account endpoints
///
/// This module provides registration and login:
///
/// # Endpoints
///
/// - `POST /sign-up` - Register new user
/// - `POST /login` - Exchange email and password for an access token

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use feedline_shared::{auth::credentials::Registration, models::PublicProfile};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Sign-up request
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Free-form profile text
    #[serde(default)]
    #[validate(length(max = 2000, message = "Profile must be at most 2000 characters"))]
    pub profile: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /sign-up
/// Content-Type: application/json
///
/// {
///   "email": "user3@gmail.com",
///   "password": "test password",
///   "name": "User3",
///   "profile": "test profile"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": 3,
///   "name": "User3",
///   "email": "user3@gmail.com",
///   "profile": "test profile"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already exists
/// - `500 Internal Server Error`: Server error
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<Json<PublicProfile>> {
    req.validate()?;

    let user = state
        .credentials
        .register(Registration {
            email: req.email,
            name: req.name,
            profile: req.profile,
            password: req.password,
        })
        .await?;

    info!(user_id = %user.id, "New account signed up");

    Ok(Json(user.public_profile()))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {
///   "email": "doge@gmail.com",
///   "password": "test password"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user_id = state.credentials.verify(&req.email, &req.password).await?;
    let issued = state.tokens.issue(user_id)?;

    info!(user_id = %user_id, expires_at = %issued.expires_at, "Issued access token");

    Ok(Json(LoginResponse {
        access_token: issued.token,
    }))
}
