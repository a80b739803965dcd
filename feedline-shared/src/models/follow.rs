/// Follow edge model and database operations
///
/// Follow edges are rows keyed by `(follower_id, followee_id)`. Membership
/// checks and removal are keyed operations on the primary key; there is no
/// in-memory graph structure.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE follows (
///     follower_id BIGINT NOT NULL REFERENCES users(id),
///     followee_id BIGINT NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (follower_id, followee_id),
///     CHECK (follower_id <> followee_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use super::user::UserId;

/// Directed edge: `follower` receives `followee`'s tweets in their timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: UserId,
    pub followee_id: UserId,
}

impl FollowEdge {
    pub fn new(follower_id: UserId, followee_id: UserId) -> Self {
        Self {
            follower_id,
            followee_id,
        }
    }

    /// Whether this edge would point a user at themselves
    pub fn is_self_follow(&self) -> bool {
        self.follower_id == self.followee_id
    }

    /// Inserts the edge if absent
    ///
    /// Returns `true` if a new row was written, `false` if the edge already
    /// existed.
    pub async fn create(pool: &PgPool, edge: FollowEdge) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            "#,
        )
        .bind(edge.follower_id)
        .bind(edge.followee_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes the edge if present
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, edge: FollowEdge) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND followee_id = $2
            "#,
        )
        .bind(edge.follower_id)
        .bind(edge.followee_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the accounts `follower` follows
    ///
    /// Generic over the executor so it can run inside the timeline snapshot
    /// transaction.
    pub async fn followees_of<'e, E>(executor: E, follower: UserId) -> Result<Vec<UserId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows: Vec<(UserId,)> = sqlx::query_as(
            r#"
            SELECT followee_id
            FROM follows
            WHERE follower_id = $1
            "#,
        )
        .bind(follower)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
