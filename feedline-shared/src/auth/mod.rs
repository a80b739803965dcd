/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: Signed, stateless bearer tokens (HS256 JWT, 24h validity)
/// - [`credentials`]: Registration and login against stored users
/// - [`middleware`]: Turning an `Authorization` header into an [`AuthContext`](middleware::AuthContext)
///
/// The token authenticator does not depend on the credential store: a token
/// is checked with the shared secret and the clock only.
///
/// # Example
///
/// ```
/// use feedline_shared::auth::password::{hash_password, verify_password, PasswordParams};
/// use feedline_shared::auth::token::TokenAuthenticator;
/// use feedline_shared::models::UserId;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password", &PasswordParams::default())?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenAuthenticator::new(b"secret-key-at-least-32-bytes-long");
/// let issued = tokens.issue(UserId(1))?;
/// assert_eq!(tokens.validate(&issued.token)?, UserId(1));
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod middleware;
pub mod password;
pub mod token;
