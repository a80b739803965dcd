/// Storage backend contract
///
/// The core components never talk to a database directly; they go through
/// this trait. Two backends implement it:
///
/// - [`PgStorage`](super::postgres::PgStorage): PostgreSQL via sqlx, used in
///   production
/// - [`MemoryStorage`](super::memory::MemoryStorage): a single-lock in-memory
///   store, used for tests and for running without a database
///
/// # Contract
///
/// - Every write is a single row or single edge and either fully applies or
///   has no effect.
/// - `insert_follow` / `delete_follow` are idempotent and report whether they
///   changed anything.
/// - Tweet ids are strictly increasing and `created_at` never goes backwards
///   in insertion order.
/// - `timeline_snapshot` reads the followee set and the followees' tweets
///   from one consistent snapshot.
///
/// # Example
///
/// ```
/// use feedline_shared::db::{memory::MemoryStorage, storage::Storage};
/// use feedline_shared::models::user::CreateUser;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = MemoryStorage::new();
/// let user = storage
///     .insert_user(CreateUser {
///         email: "user@example.com".to_string(),
///         name: "User".to_string(),
///         profile: String::new(),
///         password_hash: "$argon2id$...".to_string(),
///     })
///     .await?;
///
/// storage.insert_tweet(user.id, "Hello World").await?;
/// assert_eq!(storage.tweets_by(user.id).await?.len(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::StorageError;
use crate::models::{user::CreateUser, FollowEdge, Tweet, User, UserId};

/// Followee set and their tweet streams, read at one point in time
#[derive(Debug, Clone, Default)]
pub struct TimelineSnapshot {
    /// Accounts the requesting user follows
    pub followees: HashSet<UserId>,

    /// One newest-first stream per followee that has tweeted
    pub streams: Vec<Vec<Tweet>>,
}

impl TimelineSnapshot {
    /// Total number of tweets across all streams
    pub fn tweet_count(&self) -> usize {
        self.streams.iter().map(Vec::len).sum()
    }
}

/// Persistence operations used by the core components
#[async_trait]
pub trait Storage: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Inserts a user; fails with `DuplicateEmail` if the email is taken
    async fn insert_user(&self, data: CreateUser) -> Result<User, StorageError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Looks up a user by normalized email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Inserts an edge if absent; `Ok(true)` when a new edge was created
    ///
    /// Fails with `UnknownUser` if either endpoint does not exist.
    async fn insert_follow(&self, edge: FollowEdge) -> Result<bool, StorageError>;

    /// Removes an edge if present; `Ok(true)` when an edge was removed
    async fn delete_follow(&self, edge: FollowEdge) -> Result<bool, StorageError>;

    async fn followees_of(&self, user: UserId) -> Result<HashSet<UserId>, StorageError>;

    /// Appends a tweet; length has already been validated
    async fn insert_tweet(&self, author: UserId, text: &str) -> Result<Tweet, StorageError>;

    /// An author's tweets, newest first
    async fn tweets_by(&self, author: UserId) -> Result<Vec<Tweet>, StorageError>;

    /// Reads `followees_of(user)` and each followee's tweets consistently
    async fn timeline_snapshot(&self, user: UserId) -> Result<TimelineSnapshot, StorageError>;

    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), StorageError>;
}
