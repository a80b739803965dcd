/// Tweet store: append-only posts per author
///
/// Enforces the 300 character bound at write time; text that is too long is
/// rejected before anything reaches storage. Length is counted in Unicode
/// scalar values, not bytes.

use std::sync::Arc;
use tracing::info;

use crate::db::storage::Storage;
use crate::error::{ErrorCategory, StorageError};
use crate::models::{Tweet, UserId, MAX_TWEET_LENGTH};

/// Error type for tweet operations
#[derive(Debug, thiserror::Error)]
pub enum TweetError {
    /// Text exceeds [`MAX_TWEET_LENGTH`]
    #[error("Tweet is {length} characters, the limit is {max}")]
    TooLong { length: usize, max: usize },

    /// Backend failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TweetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TweetError::TooLong { .. } => ErrorCategory::Validation,
            TweetError::Storage(err) => err.category(),
        }
    }
}

/// Checks the length bound without touching storage
pub fn validate_text(text: &str) -> Result<(), TweetError> {
    let length = text.chars().count();
    if length > MAX_TWEET_LENGTH {
        return Err(TweetError::TooLong {
            length,
            max: MAX_TWEET_LENGTH,
        });
    }
    Ok(())
}

/// Owns tweets
#[derive(Clone)]
pub struct TweetStore {
    storage: Arc<dyn Storage>,
}

impl TweetStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Posts a tweet for `author`
    ///
    /// # Errors
    ///
    /// `TooLong` if `text` has more than 300 characters; nothing is stored.
    pub async fn post(&self, author: UserId, text: &str) -> Result<Tweet, TweetError> {
        validate_text(text)?;

        let tweet = self.storage.insert_tweet(author, text).await?;
        info!(tweet_id = %tweet.id, author_id = %author, "Tweet posted");

        Ok(tweet)
    }

    /// An author's tweets, newest first
    pub async fn tweets_by(&self, author: UserId) -> Result<Vec<Tweet>, TweetError> {
        Ok(self.storage.tweets_by(author).await?)
    }
}
