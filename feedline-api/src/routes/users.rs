/// User lookup endpoints
///
/// - `GET /users/:user_id` - Public profile
/// - `GET /users/:user_id/tweets` - The user's own tweets, newest first

use super::tweets::TweetResponse;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use feedline_shared::models::{PublicProfile, UserId};
use serde::{Deserialize, Serialize};

/// Author tweets response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserTweetsResponse {
    pub user_id: UserId,
    pub tweets: Vec<TweetResponse>,
}

/// Public profile of a user
///
/// # Errors
///
/// - `404 Not Found`: No such user
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<PublicProfile>> {
    let user_id = UserId(user_id);

    let user = state
        .credentials
        .find(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))?;

    Ok(Json(user.public_profile()))
}

/// Tweets written by a user; empty for unknown users
pub async fn list_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserTweetsResponse>> {
    let user_id = UserId(user_id);
    let tweets = state.tweets.tweets_by(user_id).await?;

    Ok(Json(UserTweetsResponse {
        user_id,
        tweets: tweets.into_iter().map(TweetResponse::from).collect(),
    }))
}
