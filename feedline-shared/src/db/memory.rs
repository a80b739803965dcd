/// In-memory storage backend
///
/// All state sits behind one `tokio::sync::RwLock`. Writers take the write
/// guard for a single record; `timeline_snapshot` holds one read guard for the
/// whole read, which gives it the same consistency a `REPEATABLE READ`
/// transaction gives the PostgreSQL backend.
///
/// Follow edges live in a `BTreeSet<FollowEdge>` ordered by
/// `(follower, followee)`, so membership is a keyed lookup and a user's
/// followees are one contiguous range.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

use super::storage::{Storage, TimelineSnapshot};
use crate::error::StorageError;
use crate::models::{user::CreateUser, FollowEdge, Tweet, TweetId, User, UserId};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    emails: HashMap<String, UserId>,
    follows: BTreeSet<FollowEdge>,
    tweets: Vec<Tweet>,
    // indexes into `tweets`, in insertion order
    tweets_by_author: HashMap<UserId, Vec<usize>>,
    last_user_id: i64,
    last_tweet_id: i64,
    last_tweet_at: Option<DateTime<Utc>>,
}

impl State {
    fn followees(&self, user: UserId) -> impl Iterator<Item = UserId> + '_ {
        let start = FollowEdge::new(user, UserId(i64::MIN));
        let end = FollowEdge::new(user, UserId(i64::MAX));
        self.follows.range(start..=end).map(|edge| edge.followee_id)
    }

    fn stream(&self, author: UserId) -> Vec<Tweet> {
        self.tweets_by_author
            .get(&author)
            .map(|indexes| {
                indexes
                    .iter()
                    .rev()
                    .map(|&i| self.tweets[i].clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Wall clock may step backwards; created_at must not.
fn next_created_at(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match last {
        Some(last) if last > now => last,
        _ => now,
    }
}

/// Storage backend that keeps everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, data: CreateUser) -> Result<User, StorageError> {
        let mut state = self.state.write().await;

        if state.emails.contains_key(&data.email) {
            return Err(StorageError::DuplicateEmail);
        }

        state.last_user_id += 1;
        let user = User {
            id: UserId(state.last_user_id),
            email: data.email,
            name: data.name,
            profile: data.profile,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };

        state.emails.insert(user.email.clone(), user.id);
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .emails
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn insert_follow(&self, edge: FollowEdge) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;

        for id in [edge.follower_id, edge.followee_id] {
            if !state.users.contains_key(&id) {
                return Err(StorageError::UnknownUser(id));
            }
        }

        Ok(state.follows.insert(edge))
    }

    async fn delete_follow(&self, edge: FollowEdge) -> Result<bool, StorageError> {
        Ok(self.state.write().await.follows.remove(&edge))
    }

    async fn followees_of(&self, user: UserId) -> Result<HashSet<UserId>, StorageError> {
        Ok(self.state.read().await.followees(user).collect())
    }

    async fn insert_tweet(&self, author: UserId, text: &str) -> Result<Tweet, StorageError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&author) {
            return Err(StorageError::UnknownUser(author));
        }

        let created_at = next_created_at(state.last_tweet_at, Utc::now());

        state.last_tweet_id += 1;
        let tweet = Tweet {
            id: TweetId(state.last_tweet_id),
            author_id: author,
            text: text.to_string(),
            created_at,
        };

        let index = state.tweets.len();
        state.tweets.push(tweet.clone());
        state.tweets_by_author.entry(author).or_default().push(index);
        state.last_tweet_at = Some(created_at);

        Ok(tweet)
    }

    async fn tweets_by(&self, author: UserId) -> Result<Vec<Tweet>, StorageError> {
        Ok(self.state.read().await.stream(author))
    }

    async fn timeline_snapshot(&self, user: UserId) -> Result<TimelineSnapshot, StorageError> {
        let state = self.state.read().await;

        let followees: HashSet<UserId> = state.followees(user).collect();
        let streams: Vec<Vec<Tweet>> = followees
            .iter()
            .map(|&followee| state.stream(followee))
            .filter(|stream| !stream.is_empty())
            .collect();

        debug!(
            user_id = %user,
            followees = followees.len(),
            streams = streams.len(),
            "Read timeline snapshot from memory"
        );

        Ok(TimelineSnapshot { followees, streams })
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(storage: &MemoryStorage, email: &str) -> User {
        storage
            .insert_user(CreateUser {
                email: email.to_string(),
                name: email.to_string(),
                profile: String::new(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_user_ids_are_sequential() {
        let storage = MemoryStorage::new();
        let a = user(&storage, "a@example.com").await;
        let b = user(&storage, "b@example.com").await;

        assert_eq!(a.id, UserId(1));
        assert_eq!(b.id, UserId(2));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let storage = MemoryStorage::new();
        user(&storage, "a@example.com").await;

        let result = storage
            .insert_user(CreateUser {
                email: "a@example.com".to_string(),
                name: "other".to_string(),
                profile: String::new(),
                password_hash: "hash".to_string(),
            })
            .await;

        assert!(matches!(result, Err(StorageError::DuplicateEmail)));
        assert_eq!(storage.state.read().await.users.len(), 1);
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let storage = MemoryStorage::new();
        let a = user(&storage, "a@example.com").await;

        let found = storage.find_user_by_email("a@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(a.id));
        assert!(storage
            .find_user_by_email("missing@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_follow_edges_are_a_set() {
        let storage = MemoryStorage::new();
        let a = user(&storage, "a@example.com").await;
        let b = user(&storage, "b@example.com").await;
        let edge = FollowEdge::new(a.id, b.id);

        assert!(storage.insert_follow(edge).await.unwrap());
        assert!(!storage.insert_follow(edge).await.unwrap());
        assert_eq!(storage.state.read().await.follows.len(), 1);

        assert!(storage.delete_follow(edge).await.unwrap());
        assert!(!storage.delete_follow(edge).await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_unknown_user() {
        let storage = MemoryStorage::new();
        let a = user(&storage, "a@example.com").await;

        let result = storage.insert_follow(FollowEdge::new(a.id, UserId(99))).await;
        assert!(matches!(result, Err(StorageError::UnknownUser(UserId(99)))));
    }

    #[tokio::test]
    async fn test_followees_range_excludes_other_followers() {
        let storage = MemoryStorage::new();
        let a = user(&storage, "a@example.com").await;
        let b = user(&storage, "b@example.com").await;
        let c = user(&storage, "c@example.com").await;

        storage.insert_follow(FollowEdge::new(a.id, b.id)).await.unwrap();
        storage.insert_follow(FollowEdge::new(a.id, c.id)).await.unwrap();
        storage.insert_follow(FollowEdge::new(b.id, c.id)).await.unwrap();

        let followees = storage.followees_of(a.id).await.unwrap();
        assert_eq!(followees, HashSet::from([b.id, c.id]));

        let followees = storage.followees_of(c.id).await.unwrap();
        assert!(followees.is_empty());
    }

    #[tokio::test]
    async fn test_tweets_newest_first_with_increasing_ids() {
        let storage = MemoryStorage::new();
        let a = user(&storage, "a@example.com").await;

        let first = storage.insert_tweet(a.id, "one").await.unwrap();
        let second = storage.insert_tweet(a.id, "two").await.unwrap();

        assert!(second.id > first.id);
        assert!(second.created_at >= first.created_at);

        let stream = storage.tweets_by(a.id).await.unwrap();
        let texts: Vec<&str> = stream.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "one"]);
    }

    #[test]
    fn test_created_at_never_goes_backwards() {
        let now = Utc::now();
        let later = now + chrono::Duration::seconds(5);

        assert_eq!(next_created_at(None, now), now);
        assert_eq!(next_created_at(Some(now), later), later);
        assert_eq!(next_created_at(Some(later), now), later);
    }

    #[tokio::test]
    async fn test_tweet_after_clock_step_back_keeps_last_timestamp() {
        let storage = MemoryStorage::new();
        let a = user(&storage, "a@example.com").await;
        let ahead = Utc::now() + chrono::Duration::hours(1);

        storage.state.write().await.last_tweet_at = Some(ahead);

        let tweet = storage.insert_tweet(a.id, "from the past").await.unwrap();
        assert_eq!(tweet.created_at, ahead);
        assert_eq!(storage.state.read().await.last_tweet_at, Some(ahead));

        let next = storage.insert_tweet(a.id, "still behind").await.unwrap();
        assert_eq!(next.created_at, ahead);
        assert!(next.id > tweet.id);
    }

    #[tokio::test]
    async fn test_snapshot_skips_silent_followees() {
        let storage = MemoryStorage::new();
        let a = user(&storage, "a@example.com").await;
        let b = user(&storage, "b@example.com").await;
        let c = user(&storage, "c@example.com").await;

        storage.insert_follow(FollowEdge::new(a.id, b.id)).await.unwrap();
        storage.insert_follow(FollowEdge::new(a.id, c.id)).await.unwrap();
        storage.insert_tweet(b.id, "Hi Hi").await.unwrap();
        storage.insert_tweet(a.id, "mine").await.unwrap();

        let snapshot = storage.timeline_snapshot(a.id).await.unwrap();
        assert_eq!(snapshot.followees.len(), 2);
        assert_eq!(snapshot.streams.len(), 1);
        assert_eq!(snapshot.tweet_count(), 1);
        assert_eq!(snapshot.streams[0][0].author_id, b.id);
    }
}
