/// Data models for Feedline
///
/// This module contains the persisted records and their PostgreSQL queries.
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `follow`: Directed follow edges keyed by `(follower, followee)`
/// - `tweet`: Append-only text posts
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
///     profile: String::new(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod follow;
pub mod tweet;
pub mod user;

pub use follow::FollowEdge;
pub use tweet::{Tweet, TweetId, MAX_TWEET_LENGTH};
pub use user::{PublicProfile, User, UserId};
