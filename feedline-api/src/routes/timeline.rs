/// Timeline endpoints
///
/// - `GET /timeline` - Authenticated user's timeline
/// - `GET /timeline/:user_id` - Any user's timeline
///
/// # Response
///
/// ```json
/// {
///   "user_id": 1,
///   "timeline": [
///     { "user_id": 2, "tweet": "Hi Hi" }
///   ]
/// }
/// ```
///
/// Entries are newest first and only come from accounts the user follows.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use feedline_shared::{auth::middleware::AuthContext, models::UserId, timeline::TimelineEntry};
use serde::{Deserialize, Serialize};

/// One timeline item on the wire
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Author
    pub user_id: UserId,
    pub tweet: String,
}

impl From<TimelineEntry> for TimelineItem {
    fn from(entry: TimelineEntry) -> Self {
        Self {
            user_id: entry.author_id,
            tweet: entry.text,
        }
    }
}

/// Timeline response
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineResponse {
    pub user_id: UserId,
    pub timeline: Vec<TimelineItem>,
}

async fn render(state: &AppState, user_id: UserId) -> ApiResult<Json<TimelineResponse>> {
    let entries = state.timeline.compose(user_id).await?;

    Ok(Json(TimelineResponse {
        user_id,
        timeline: entries.into_iter().map(TimelineItem::from).collect(),
    }))
}

pub async fn user_timeline(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<TimelineResponse>> {
    render(&state, UserId(user_id)).await
}

pub async fn own_timeline(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TimelineResponse>> {
    render(&state, auth.user_id).await
}
