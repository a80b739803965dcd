/// Tweet endpoint
///
/// - `POST /tweet` - Post a tweet as the authenticated user

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use feedline_shared::{
    auth::middleware::AuthContext,
    models::{Tweet, TweetId, UserId},
};
use serde::{Deserialize, Serialize};

/// Post tweet request
#[derive(Debug, Deserialize)]
pub struct TweetRequest {
    /// Tweet text, at most 300 characters
    pub tweet: String,
}

/// A tweet as rendered on the wire
#[derive(Debug, Serialize, Deserialize)]
pub struct TweetResponse {
    pub id: TweetId,
    pub user_id: UserId,
    pub tweet: String,
    pub created_at: DateTime<Utc>,
}

impl From<Tweet> for TweetResponse {
    fn from(tweet: Tweet) -> Self {
        Self {
            id: tweet.id,
            user_id: tweet.author_id,
            tweet: tweet.text,
            created_at: tweet.created_at,
        }
    }
}

/// Post a tweet
///
/// # Endpoint
///
/// ```text
/// POST /tweet
/// Authorization: <token>
/// Content-Type: application/json
///
/// { "tweet": "Hello World" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Longer than 300 characters
/// - `401 Unauthorized`: Missing or invalid token
pub async fn post_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<TweetRequest>,
) -> ApiResult<Json<TweetResponse>> {
    let tweet = state.tweets.post(auth.user_id, &req.tweet).await?;

    Ok(Json(tweet.into()))
}
