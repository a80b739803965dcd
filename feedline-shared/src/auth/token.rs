/// Bearer token issuing and validation
///
/// Tokens are HS256-signed JWTs carrying the user id, issue time, expiry and
/// issuer. Nothing is stored server-side: validation needs only the token, the
/// shared secret and the wall clock, so it never touches storage.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Validity**: fixed 24 hours, no leeway
/// - **Revocation**: none; a leaked token stays valid until it expires
/// - **Secret**: passed in at construction, at least 32 bytes in production
///
/// # Example
///
/// ```
/// use feedline_shared::auth::token::TokenAuthenticator;
/// use feedline_shared::models::UserId;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenAuthenticator::new(b"your-secret-key-at-least-32-bytes");
///
/// let issued = tokens.issue(UserId(1))?;
/// assert_eq!(tokens.validate(&issued.token)?, UserId(1));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ErrorCategory;
use crate::models::UserId;

/// Value of the `iss` claim
pub const TOKEN_ISSUER: &str = "feedline";

/// Token lifetime in seconds (24 hours)
pub const TOKEN_VALIDITY_SECS: i64 = 60 * 60 * 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token structure, encoding or claims could not be parsed
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signature does not verify against the secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Current time is past `exp`
    #[error("Token has expired")]
    Expired,

    /// Signing failed
    #[error("Failed to create token: {0}")]
    CreateError(String),
}

impl TokenError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TokenError::CreateError(_) => ErrorCategory::Internal,
            _ => ErrorCategory::Authentication,
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user
    pub user_id: UserId,

    /// Issuer, always [`TOKEN_ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims issued now with the standard validity window
    pub fn new(user_id: UserId) -> Self {
        Self::issued_at(user_id, Utc::now(), Duration::seconds(TOKEN_VALIDITY_SECS))
    }

    /// Claims issued at an explicit instant with an explicit validity
    pub fn issued_at(user_id: UserId, issued_at: DateTime<Utc>, valid_for: Duration) -> Self {
        Self {
            user_id,
            iss: TOKEN_ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + valid_for).timestamp(),
        }
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// A freshly signed token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// Compact JWT string
    pub token: String,

    pub user_id: UserId,

    pub expires_at: DateTime<Utc>,
}

/// Issues and validates signed, self-contained tokens
///
/// Holds the signing keys derived from one shared secret. Cheap to share
/// behind an `Arc`; validation does no I/O.
#[derive(Clone)]
pub struct TokenAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenAuthenticator {
    /// Builds an authenticator from the shared signing secret
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issues a token for `user_id` valid for the next 24 hours
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken, TokenError> {
        let claims = Claims::new(user_id);
        let token = self.sign(&claims)?;

        Ok(IssuedToken {
            token,
            user_id,
            expires_at: claims.expires_at(),
        })
    }

    /// Signs arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies signature, issuer and expiry and returns the claims
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` if the signature does not match the secret
    /// - `Expired` if the current time is past `exp`
    /// - `Malformed` for anything else (bad encoding, bad JSON, wrong
    ///   algorithm, missing or wrong claims)
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }

    /// Validates a token and recovers the user it was issued to
    pub fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        self.decode(token).map(|claims| claims.user_id)
    }
}
