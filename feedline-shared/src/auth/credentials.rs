/// Credential store: registration and password verification
///
/// Owns user identity records through the [`Storage`] backend. Plaintext
/// passwords exist only for the duration of a call; only Argon2id hashes are
/// persisted.
///
/// Argon2 is deliberately slow, so hashing and verification run on tokio's
/// blocking pool rather than on the async worker threads.
///
/// Login failures are uniform: an unknown email and a wrong password both
/// yield [`CredentialError::AuthenticationFailed`], and an unknown email is
/// still checked against a decoy hash so both paths cost the same.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use feedline_shared::auth::credentials::{CredentialStore, Registration};
/// use feedline_shared::auth::password::PasswordParams;
/// use feedline_shared::db::memory::MemoryStorage;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = CredentialStore::new(Arc::new(MemoryStorage::new()), PasswordParams::default())?;
///
/// let user = store
///     .register(Registration {
///         email: "doge@gmail.com".to_string(),
///         name: "Doge".to_string(),
///         profile: "test profile".to_string(),
///         password: "test password".to_string(),
///     })
///     .await?;
///
/// let id = store.verify("doge@gmail.com", "test password").await?;
/// assert_eq!(id, user.id);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use tracing::{debug, info};

use super::password::{hash_password, verify_password, PasswordError, PasswordParams};
use crate::db::storage::Storage;
use crate::error::{ErrorCategory, StorageError};
use crate::models::user::{normalize_email, CreateUser};
use crate::models::{User, UserId};

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Email already registered
    #[error("Email already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Hashing failed or stored hash is corrupt
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Blocking hash task panicked or was cancelled
    #[error("Password task failed: {0}")]
    TaskFailed(String),

    /// Backend failure
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for CredentialError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateEmail => CredentialError::DuplicateEmail,
            other => CredentialError::Storage(other),
        }
    }
}

impl CredentialError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CredentialError::DuplicateEmail => ErrorCategory::Conflict,
            CredentialError::AuthenticationFailed => ErrorCategory::Authentication,
            CredentialError::Password(_) | CredentialError::TaskFailed(_) => ErrorCategory::Internal,
            CredentialError::Storage(err) => err.category(),
        }
    }
}

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub profile: String,
    pub password: String,
}

/// Registers users and verifies their passwords
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn Storage>,
    params: PasswordParams,
    decoy_hash: Arc<str>,
}

impl CredentialStore {
    /// Creates a store hashing with `params`
    ///
    /// Computes the decoy hash used for unknown emails up front, which costs
    /// one Argon2 evaluation.
    pub fn new(storage: Arc<dyn Storage>, params: PasswordParams) -> Result<Self, PasswordError> {
        let decoy_hash = hash_password("feedline-decoy-password", &params)?;

        Ok(Self {
            storage,
            params,
            decoy_hash: decoy_hash.into(),
        })
    }

    /// Registers a new account
    ///
    /// # Errors
    ///
    /// `DuplicateEmail` if the (normalized) email is already registered.
    pub async fn register(&self, registration: Registration) -> Result<User, CredentialError> {
        let email = normalize_email(&registration.email);
        let params = self.params;
        let password = registration.password;

        let password_hash = run_blocking(move || hash_password(&password, &params)).await?;

        let user = self
            .storage
            .insert_user(CreateUser {
                email,
                name: registration.name,
                profile: registration.profile,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Checks an email/password pair and returns the matching user id
    ///
    /// # Errors
    ///
    /// `AuthenticationFailed` for an unknown email or a wrong password.
    pub async fn verify(&self, email: &str, password: &str) -> Result<UserId, CredentialError> {
        let user = self.storage.find_user_by_email(&normalize_email(email)).await?;

        let (user_id, hash) = match &user {
            Some(user) => (Some(user.id), user.password_hash.clone()),
            None => (None, self.decoy_hash.to_string()),
        };

        let password = password.to_string();
        let matches = run_blocking(move || verify_password(&password, &hash)).await?;

        match (user_id, matches) {
            (Some(id), true) => {
                debug!(user_id = %id, "Password verified");
                Ok(id)
            }
            (Some(id), false) => {
                debug!(user_id = %id, "Password mismatch");
                Err(CredentialError::AuthenticationFailed)
            }
            (None, _) => {
                debug!("Login attempt for unknown email");
                Err(CredentialError::AuthenticationFailed)
            }
        }
    }

    /// Looks up a user by id
    pub async fn find(&self, id: UserId) -> Result<Option<User>, CredentialError> {
        Ok(self.storage.find_user(id).await?)
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, CredentialError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CredentialError::TaskFailed(e.to_string()))?
        .map_err(CredentialError::from)
}
