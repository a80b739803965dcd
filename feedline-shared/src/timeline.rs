/// Timeline composition
///
/// A user's timeline is the union of the tweets of everyone they follow,
/// newest first. Each followee's stream is already sorted newest first, so the
/// streams are combined with a k-way merge: a max-heap holds the current head
/// of each stream, and popping the heap yields the next-newest tweet overall.
/// With n tweets across k streams this is O(n log k) and the heap never holds
/// more than k entries.
///
/// Ties on `created_at` are broken by tweet id, higher first, so the output is
/// fully deterministic.
///
/// The followee set and the streams come from one storage snapshot, so a
/// concurrent follow/unfollow/post never produces a half-applied view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::vec::IntoIter;
use tracing::debug;

use crate::db::storage::Storage;
use crate::error::{ErrorCategory, StorageError};
use crate::models::{Tweet, TweetId, UserId};

/// Error type for timeline composition
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TimelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TimelineError::Storage(err) => err.category(),
        }
    }
}

/// One timeline item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub tweet_id: TweetId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Tweet> for TimelineEntry {
    fn from(tweet: Tweet) -> Self {
        Self {
            tweet_id: tweet.id,
            author_id: tweet.author_id,
            text: tweet.text,
            created_at: tweet.created_at,
        }
    }
}

/// Current head of one stream inside the merge heap
struct StreamHead {
    tweet: Tweet,
    rest: IntoIter<Tweet>,
}

impl PartialEq for StreamHead {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StreamHead {}

impl PartialOrd for StreamHead {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StreamHead {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: the newest head sits on top
        self.tweet.recency_key().cmp(&other.tweet.recency_key())
    }
}

/// Merges newest-first streams into one newest-first sequence
///
/// Each input stream must already be sorted by `(created_at, id)`
/// descending. Empty streams are skipped.
pub fn merge_streams(streams: Vec<Vec<Tweet>>) -> Vec<Tweet> {
    let total = streams.iter().map(Vec::len).sum();
    let mut heap = BinaryHeap::with_capacity(streams.len());

    for stream in streams {
        let mut rest = stream.into_iter();
        if let Some(tweet) = rest.next() {
            heap.push(StreamHead { tweet, rest });
        }
    }

    let mut merged = Vec::with_capacity(total);
    while let Some(StreamHead { tweet, mut rest }) = heap.pop() {
        merged.push(tweet);
        if let Some(next) = rest.next() {
            heap.push(StreamHead { tweet: next, rest });
        }
    }

    merged
}

/// Builds timelines from the follow graph and tweet streams
#[derive(Clone)]
pub struct TimelineComposer {
    storage: Arc<dyn Storage>,
}

impl TimelineComposer {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Tweets of everyone `user` follows, newest first
    ///
    /// The user's own tweets are never included. An empty timeline (no
    /// followees, or followees that never posted) is not an error.
    pub async fn compose(&self, user: UserId) -> Result<Vec<TimelineEntry>, TimelineError> {
        let snapshot = self.storage.timeline_snapshot(user).await?;
        let followee_count = snapshot.followees.len();

        let streams: Vec<Vec<Tweet>> = snapshot
            .streams
            .into_iter()
            .filter(|stream| {
                stream
                    .first()
                    .is_some_and(|head| head.author_id != user && snapshot.followees.contains(&head.author_id))
            })
            .collect();

        let entries: Vec<TimelineEntry> = merge_streams(streams)
            .into_iter()
            .map(TimelineEntry::from)
            .collect();

        debug!(
            user_id = %user,
            followees = followee_count,
            entries = entries.len(),
            "Composed timeline"
        );

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStorage;
    use crate::graph::FollowGraph;
    use crate::models::user::CreateUser;
    use crate::tweets::TweetStore;
    use chrono::TimeZone;

    fn tweet(id: i64, author: i64, secs: i64) -> Tweet {
        Tweet {
            id: TweetId(id),
            author_id: UserId(author),
            text: format!("tweet {}", id),
            created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    fn ids(tweets: &[Tweet]) -> Vec<i64> {
        tweets.iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_streams(Vec::new()).is_empty());
        assert!(merge_streams(vec![Vec::new(), Vec::new()]).is_empty());
    }

    #[test]
    fn test_merge_single_stream_is_unchanged() {
        let stream = vec![tweet(3, 1, 30), tweet(2, 1, 20), tweet(1, 1, 10)];
        assert_eq!(merge_streams(vec![stream.clone()]), stream);
    }

    #[test]
    fn test_merge_interleaves_by_recency() {
        let a = vec![tweet(6, 1, 60), tweet(3, 1, 30), tweet(1, 1, 10)];
        let b = vec![tweet(5, 2, 50), tweet(4, 2, 40)];
        let c = vec![tweet(2, 3, 20)];

        let merged = merge_streams(vec![a, b, c]);
        assert_eq!(ids(&merged), vec![6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_merge_breaks_ties_by_id() {
        let a = vec![tweet(10, 1, 100), tweet(7, 1, 50)];
        let b = vec![tweet(11, 2, 100), tweet(8, 2, 50)];
        let c = vec![tweet(9, 3, 50)];

        let merged = merge_streams(vec![a, b, c]);
        assert_eq!(ids(&merged), vec![11, 10, 9, 8, 7]);
    }

    #[test]
    fn test_merge_output_is_sorted() {
        let streams: Vec<Vec<Tweet>> = (0..5)
            .map(|author| {
                (0..20)
                    .rev()
                    .map(|i| tweet(author * 100 + i, author, (i * 7 + author * 3) % 40 + i * 40))
                    .collect()
            })
            .collect();

        let merged = merge_streams(streams);
        assert_eq!(merged.len(), 100);
        assert!(merged
            .windows(2)
            .all(|pair| pair[0].recency_key() > pair[1].recency_key()));
    }

    async fn users(storage: &MemoryStorage, n: usize) -> Vec<UserId> {
        let mut ids = Vec::new();
        for i in 0..n {
            let user = storage
                .insert_user(CreateUser {
                    email: format!("user{}@example.com", i),
                    name: format!("User {}", i),
                    profile: String::new(),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_compose_only_followees_newest_first() {
        let storage = Arc::new(MemoryStorage::new());
        let u = users(&storage, 4).await;

        let graph = FollowGraph::new(storage.clone());
        let tweets = TweetStore::new(storage.clone());
        let composer = TimelineComposer::new(storage.clone());

        graph.follow(u[0], u[1]).await.unwrap();
        graph.follow(u[0], u[2]).await.unwrap();

        tweets.post(u[1], "one").await.unwrap();
        tweets.post(u[3], "stranger").await.unwrap();
        tweets.post(u[0], "mine").await.unwrap();
        tweets.post(u[2], "two").await.unwrap();
        tweets.post(u[1], "three").await.unwrap();

        let timeline = composer.compose(u[0]).await.unwrap();
        let texts: Vec<&str> = timeline.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["three", "two", "one"]);
        assert!(timeline.iter().all(|e| e.author_id != u[0]));
    }

    #[tokio::test]
    async fn test_compose_without_followees_is_empty() {
        let storage = Arc::new(MemoryStorage::new());
        let u = users(&storage, 1).await;

        TweetStore::new(storage.clone()).post(u[0], "alone").await.unwrap();

        let timeline = TimelineComposer::new(storage).compose(u[0]).await.unwrap();
        assert!(timeline.is_empty());
    }

    #[tokio::test]
    async fn test_compose_after_unfollow() {
        let storage = Arc::new(MemoryStorage::new());
        let u = users(&storage, 3).await;

        let graph = FollowGraph::new(storage.clone());
        let tweets = TweetStore::new(storage.clone());
        let composer = TimelineComposer::new(storage.clone());

        graph.follow(u[0], u[1]).await.unwrap();
        graph.follow(u[0], u[2]).await.unwrap();
        tweets.post(u[1], "from one").await.unwrap();
        tweets.post(u[2], "from two").await.unwrap();

        graph.unfollow(u[0], u[1]).await.unwrap();

        let timeline = composer.compose(u[0]).await.unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].author_id, u[2]);
    }
}
