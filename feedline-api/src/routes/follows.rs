/// Follow graph endpoints
///
/// - `POST /follow` - Follow another user
/// - `POST /unfollow` - Stop following a user
///
/// Both act on behalf of the authenticated user and are idempotent.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Extension, Json};
use feedline_shared::{auth::middleware::AuthContext, models::UserId};
use serde::Deserialize;

/// Follow request
#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    /// User to follow
    pub follow: UserId,
}

/// Unfollow request
#[derive(Debug, Deserialize)]
pub struct UnfollowRequest {
    /// User to stop following
    pub unfollow: UserId,
}

/// Follow a user
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: Target user does not exist
/// - `409 Conflict`: Target is the caller
pub async fn follow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<FollowRequest>,
) -> ApiResult<StatusCode> {
    state.graph.follow(auth.user_id, req.follow).await?;
    Ok(StatusCode::OK)
}

/// Unfollow a user; succeeds even if the caller was not following them
pub async fn unfollow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UnfollowRequest>,
) -> ApiResult<StatusCode> {
    state.graph.unfollow(auth.user_id, req.unfollow).await?;
    Ok(StatusCode::OK)
}
