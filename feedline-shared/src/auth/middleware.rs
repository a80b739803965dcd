/// Request authentication helpers for Axum
///
/// Extracts the token from the `Authorization` header, validates it with the
/// [`TokenAuthenticator`] and produces an [`AuthContext`] that handlers read
/// from request extensions.
///
/// Both `Authorization: Bearer <token>` and a bare `Authorization: <token>`
/// are accepted.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use feedline_shared::auth::{middleware::authenticate_headers, token::TokenAuthenticator};
/// use feedline_shared::models::UserId;
///
/// let tokens = TokenAuthenticator::new(b"your-secret-key-at-least-32-bytes");
/// let issued = tokens.issue(UserId(1)).unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&issued.token).unwrap());
///
/// let auth = authenticate_headers(&tokens, &headers).unwrap();
/// assert_eq!(auth.user_id, UserId(1));
/// ```

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::token::{TokenAuthenticator, TokenError};
use crate::error::ErrorCategory;
use crate::models::UserId;

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// User the token was issued to
    pub user_id: UserId,

    /// When the presented token stops being valid
    pub expires_at: DateTime<Utc>,
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable `Authorization` header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Token present but rejected
    #[error(transparent)]
    InvalidToken(#[from] TokenError),
}

impl AuthError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AuthError::MissingCredentials => ErrorCategory::Authentication,
            AuthError::InvalidToken(err) => err.category(),
        }
    }
}

/// Pulls the raw token out of the `Authorization` header
///
/// Strips an optional `Bearer` scheme. Returns `None` if the header is
/// absent, not valid ASCII or carries no token.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authenticates a request from its headers
pub fn authenticate_headers(
    tokens: &TokenAuthenticator,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::MissingCredentials)?;
    let claims = tokens.decode(token)?;

    Ok(AuthContext {
        user_id: claims.user_id,
        expires_at: claims.expires_at(),
    })
}
