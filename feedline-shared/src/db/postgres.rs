/// PostgreSQL storage backend
///
/// Thin adapter from the [`Storage`] contract onto the model queries in
/// [`crate::models`]. Constraint violations are translated into typed
/// storage errors:
///
/// - unique violation on `users.email` → [`StorageError::DuplicateEmail`]
/// - foreign key violation on `follows` / `tweets` → [`StorageError::UnknownUser`]
///
/// The timeline read runs in a `REPEATABLE READ, READ ONLY` transaction so the
/// followee set and the tweets fetched for it come from the same snapshot.
///
/// # Example
///
/// ```no_run
/// use feedline_shared::db::pool::{create_pool, DatabaseConfig};
/// use feedline_shared::db::postgres::PgStorage;
/// use feedline_shared::db::storage::Storage;
/// use feedline_shared::models::UserId;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let storage = PgStorage::new(pool);
/// let snapshot = storage.timeline_snapshot(UserId(1)).await?;
/// println!("{} tweets", snapshot.tweet_count());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::debug;

use super::storage::{Storage, TimelineSnapshot};
use crate::error::StorageError;
use crate::models::{
    tweet::group_by_author,
    user::CreateUser,
    FollowEdge, Tweet, User, UserId,
};

/// Storage backend over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a foreign key violation to `UnknownUser(id)`, anything else passes through
fn unknown_user_or(err: sqlx::Error, id: UserId) -> StorageError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            StorageError::UnknownUser(id)
        }
        _ => StorageError::Database(err),
    }
}

const FOLLOWER_FKEY: &str = "follows_follower_id_fkey";

/// Picks the side of `edge` named by a violated `follows` foreign key
fn missing_follow_side(constraint: Option<&str>, edge: FollowEdge) -> UserId {
    match constraint {
        Some(FOLLOWER_FKEY) => edge.follower_id,
        _ => edge.followee_id,
    }
}

fn unknown_follow_user_or(err: sqlx::Error, edge: FollowEdge) -> StorageError {
    let id = match &err {
        sqlx::Error::Database(db_err) => missing_follow_side(db_err.constraint(), edge),
        _ => edge.followee_id,
    };
    unknown_user_or(err, id)
}

#[async_trait]
impl Storage for PgStorage {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn insert_user(&self, data: CreateUser) -> Result<User, StorageError> {
        User::create(&self.pool, data).await.map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::DuplicateEmail
            }
            _ => StorageError::Database(err),
        })
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn insert_follow(&self, edge: FollowEdge) -> Result<bool, StorageError> {
        FollowEdge::create(&self.pool, edge)
            .await
            .map_err(|err| unknown_follow_user_or(err, edge))
    }

    async fn delete_follow(&self, edge: FollowEdge) -> Result<bool, StorageError> {
        Ok(FollowEdge::delete(&self.pool, edge).await?)
    }

    async fn followees_of(&self, user: UserId) -> Result<HashSet<UserId>, StorageError> {
        let followees = FollowEdge::followees_of(&self.pool, user).await?;
        Ok(followees.into_iter().collect())
    }

    async fn insert_tweet(&self, author: UserId, text: &str) -> Result<Tweet, StorageError> {
        Tweet::create(&self.pool, author, text)
            .await
            .map_err(|err| unknown_user_or(err, author))
    }

    async fn tweets_by(&self, author: UserId) -> Result<Vec<Tweet>, StorageError> {
        Ok(Tweet::list_by_author(&self.pool, author).await?)
    }

    async fn timeline_snapshot(&self, user: UserId) -> Result<TimelineSnapshot, StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let followees = FollowEdge::followees_of(&mut *tx, user).await?;
        let rows = if followees.is_empty() {
            Vec::new()
        } else {
            Tweet::list_by_authors(&mut *tx, &followees).await?
        };

        tx.commit().await?;

        let streams = group_by_author(rows);

        debug!(
            user_id = %user,
            followees = followees.len(),
            streams = streams.len(),
            "Read timeline snapshot from postgres"
        );

        Ok(TimelineSnapshot {
            followees: followees.into_iter().collect(),
            streams,
        })
    }

    async fn ping(&self) -> Result<(), StorageError> {
        super::pool::health_check(&self.pool).await?;
        Ok(())
    }
}
