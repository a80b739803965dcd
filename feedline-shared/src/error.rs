/// Error taxonomy shared by the core components
///
/// Each component has its own error enum (credentials, tokens, follow graph,
/// tweets, timeline). All of them map onto one of the categories below, which
/// is what the transport layer uses to pick a client-facing status.
///
/// Authentication failures keep their precise cause internally for logging,
/// but every variant in that category is rendered identically to clients.

use serde::Serialize;

/// Client-facing error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed input, text too long
    Validation,

    /// Bad credentials; missing, invalid or expired token
    Authentication,

    /// Duplicate email, self-follow
    Conflict,

    /// Referenced record does not exist
    NotFound,

    /// Storage or unexpected failure
    Internal,
}

/// Error type for storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Unique constraint on the email column
    #[error("Email already registered")]
    DuplicateEmail,

    /// A referenced user row does not exist
    #[error("Unknown user: {0}")]
    UnknownUser(crate::models::UserId),

    /// Database driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other backend failure
    #[error("Storage failure: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StorageError::DuplicateEmail => ErrorCategory::Conflict,
            StorageError::UnknownUser(_) => ErrorCategory::NotFound,
            StorageError::Database(_) | StorageError::Backend(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;

    #[test]
    fn test_storage_error_categories() {
        assert_eq!(StorageError::DuplicateEmail.category(), ErrorCategory::Conflict);
        assert_eq!(
            StorageError::UnknownUser(UserId(4)).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            StorageError::Backend("lost connection".to_string()).category(),
            ErrorCategory::Internal
        );
        assert_eq!(
            StorageError::Database(sqlx::Error::PoolTimedOut).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorCategory::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }
}
