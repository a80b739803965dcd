/// Tweet model and database operations
///
/// Tweets are append-only and immutable. Every read returns them newest
/// first, ordered by `(created_at DESC, id DESC)`; the id breaks ties between
/// tweets stamped with the same instant.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tweets (
///     id BIGSERIAL PRIMARY KEY,
///     author_id BIGINT NOT NULL REFERENCES users(id),
///     text VARCHAR(300) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
///
/// CREATE INDEX tweets_author_recency_idx
///     ON tweets (author_id, created_at DESC, id DESC);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::fmt;

use super::user::UserId;

/// Maximum tweet length in characters (Unicode scalar values)
pub const MAX_TWEET_LENGTH: usize = 300;

/// Strictly increasing tweet identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct TweetId(pub i64);

impl fmt::Display for TweetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A posted tweet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tweet {
    pub id: TweetId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Tweet {
    /// Sort key for recency ordering; larger means newer
    pub fn recency_key(&self) -> (DateTime<Utc>, TweetId) {
        (self.created_at, self.id)
    }

    /// Inserts a tweet; the caller has already enforced the length bound
    pub async fn create(pool: &PgPool, author_id: UserId, text: &str) -> Result<Self, sqlx::Error> {
        let tweet = sqlx::query_as::<_, Tweet>(
            r#"
            INSERT INTO tweets (author_id, text)
            VALUES ($1, $2)
            RETURNING id, author_id, text, created_at
            "#,
        )
        .bind(author_id)
        .bind(text)
        .fetch_one(pool)
        .await?;

        Ok(tweet)
    }

    /// Lists one author's tweets, newest first
    pub async fn list_by_author<'e, E>(executor: E, author_id: UserId) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Tweet>(
            r#"
            SELECT id, author_id, text, created_at
            FROM tweets
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(executor)
        .await
    }

    /// Lists the tweets of several authors in one round trip
    ///
    /// Rows come back grouped by author and newest first within each
    /// author, ready to be split into per-author streams.
    pub async fn list_by_authors<'e, E>(executor: E, authors: &[UserId]) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let ids: Vec<i64> = authors.iter().map(|id| id.0).collect();

        sqlx::query_as::<_, Tweet>(
            r#"
            SELECT id, author_id, text, created_at
            FROM tweets
            WHERE author_id = ANY($1)
            ORDER BY author_id, created_at DESC, id DESC
            "#,
        )
        .bind(ids)
        .fetch_all(executor)
        .await
    }
}

/// Splits author-grouped rows into one newest-first stream per author
///
/// Expects the row order produced by [`Tweet::list_by_authors`].
pub fn group_by_author(rows: Vec<Tweet>) -> Vec<Vec<Tweet>> {
    let mut streams: Vec<Vec<Tweet>> = Vec::new();

    for tweet in rows {
        match streams.last_mut() {
            Some(stream) if stream[0].author_id == tweet.author_id => stream.push(tweet),
            _ => streams.push(vec![tweet]),
        }
    }

    streams
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tweet(id: i64, author: i64, secs: i64) -> Tweet {
        Tweet {
            id: TweetId(id),
            author_id: UserId(author),
            text: format!("tweet {}", id),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_recency_key_breaks_ties_by_id() {
        let older = tweet(1, 1, 100);
        let newer = tweet(2, 1, 100);
        assert!(newer.recency_key() > older.recency_key());
    }

    #[test]
    fn test_group_by_author() {
        let rows = vec![
            tweet(5, 1, 50),
            tweet(2, 1, 20),
            tweet(4, 3, 40),
            tweet(9, 7, 90),
            tweet(8, 7, 80),
        ];

        let streams = group_by_author(rows);
        assert_eq!(streams.len(), 3);
        assert_eq!(streams[0].len(), 2);
        assert_eq!(streams[1][0].id, TweetId(4));
        assert_eq!(streams[2][1].id, TweetId(8));
    }

    #[test]
    fn test_group_by_author_empty() {
        assert!(group_by_author(Vec::new()).is_empty());
    }
}
