/// User model and database operations
///
/// This module provides the User model and the queries the credential store
/// needs: create, lookup by id and lookup by email. Users are never deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email TEXT NOT NULL UNIQUE,
///     name TEXT NOT NULL,
///     profile TEXT NOT NULL DEFAULT '',
///     password_hash TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use feedline_shared::models::user::{User, CreateUser};
/// use feedline_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     name: "Hong Gildong".to_string(),
///     profile: "hello".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// let found = User::find_by_email(&pool, "user@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

/// Unique, immutable user identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

/// User account
///
/// Passwords are stored as Argon2id PHC strings, never in plaintext, and the
/// hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: UserId,

    /// Normalized (trimmed, lowercase) email address, unique across users
    pub email: String,

    /// Display name
    pub name: String,

    /// Free-form profile text
    pub profile: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Publicly visible part of a user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub profile: String,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            profile: user.profile.clone(),
        }
    }
}

/// Input for creating a new user
///
/// The password must already be hashed; `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub profile: String,
    pub password_hash: String,
}

/// Normalizes an email address for storage and lookup
///
/// Uniqueness is case-insensitive, so both registration and login go through
/// this function.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns a database error if the email already exists (unique
    /// constraint `users_email_key`) or the connection fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, profile, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, profile, password_hash, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.name)
        .bind(data.profile)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, profile, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by (normalized) email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, profile, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Returns the public part of this record
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Doge@Gmail.COM "), "doge@gmail.com");
        assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: UserId(7),
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            profile: String::new(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn test_public_profile_from_user() {
        let user = User {
            id: UserId(3),
            email: "b@example.com".to_string(),
            name: "B".to_string(),
            profile: "bio".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        };

        let profile = user.public_profile();
        assert_eq!(profile.id, UserId(3));
        assert_eq!(profile.profile, "bio");
    }
}
