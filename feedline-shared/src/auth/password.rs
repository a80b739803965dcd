/// Password hashing using Argon2id
///
/// Passwords are hashed with Argon2id and a fresh 16-byte random salt per
/// call. The result is a PHC string that embeds algorithm, version,
/// parameters and salt, so verification needs nothing but the stored string.
///
/// # Security
///
/// - **Algorithm**: Argon2id, version 0x13
/// - **Default cost**: 64 MiB memory, 3 passes, 4 lanes
/// - **Output**: 32-byte hash
/// - **Comparison**: constant time (inside `argon2`)
///
/// # Example
///
/// ```
/// use feedline_shared::auth::password::{hash_password, verify_password, PasswordParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = PasswordParams::default();
/// let hash = hash_password("super_secret_password_123", &params)?;
///
/// assert!(verify_password("super_secret_password_123", &hash)?);
/// assert!(!verify_password("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

use crate::error::ErrorCategory;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

impl PasswordError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Internal
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536, // 64 MiB
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl PasswordParams {
    fn hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(self.memory_kib)
            .t_cost(self.iterations)
            .p_cost(self.parallelism)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

        Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes a password with Argon2id
///
/// # Returns
///
/// PHC string, e.g.
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the parameters are out of range or
/// hashing fails.
pub fn hash_password(password: &str, params: &PasswordParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored PHC hash
///
/// Parameters and salt are read from the hash itself.
///
/// # Returns
///
/// `Ok(true)` on match, `Ok(false)` on mismatch
///
/// # Errors
///
/// `InvalidHash` if the stored string cannot be parsed or carries no hash
/// output, `VerifyError` for any other failure.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // A PHC string without a hash part parses, but can never match.
    if parsed_hash.hash.is_none() {
        return Err(PasswordError::InvalidHash("Hash has no output part".to_string()));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordParams {
        PasswordParams {
            memory_kib: 4096,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_default_params() {
        let params = PasswordParams::default();
        assert_eq!(params.memory_kib, 65536);
        assert_eq!(params.iterations, 3);
        assert_eq!(params.parallelism, 4);
    }

    #[test]
    fn test_hash_password_encodes_params() {
        let hash = hash_password("test_password_123", &PasswordParams::default())
            .expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password", &cheap()).unwrap();
        let hash2 = hash_password("same_password", &cheap()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("test password", &cheap()).unwrap();

        assert!(verify_password("test password", &hash).unwrap());
        assert!(!verify_password("test passwore", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(matches!(
            verify_password("password", "invalid_hash"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(matches!(
            verify_password("password", "$argon2id$invalid"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_verify_password_truncated_hash() {
        let hash = hash_password("test password", &cheap()).unwrap();
        let (without_output, _) = hash.rsplit_once('$').unwrap();

        assert!(matches!(
            verify_password("test password", without_output),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = PasswordParams {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        };

        assert!(matches!(
            hash_password("password", &params),
            Err(PasswordError::HashError(_))
        ));
    }

    #[test]
    fn test_unicode_passwords_roundtrip() {
        for password in ["with spaces", "unicode-密码-パスワード", "테스트 비밀번호"] {
            let hash = hash_password(password, &cheap()).unwrap();
            assert!(verify_password(password, &hash).unwrap(), "{} should verify", password);
        }
    }
}
