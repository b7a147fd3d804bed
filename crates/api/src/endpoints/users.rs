//! User profile endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use travelboard_common::AppResult;
use travelboard_core::UserProfile;

use crate::{extractors::MaybeAuthIdentity, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/show", post(show))
}

/// Show user request. One of `userId` or `username` is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUserRequest {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// Show a user profile with counts.
async fn show(
    MaybeAuthIdentity(identity): MaybeAuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ShowUserRequest>,
) -> AppResult<ApiResponse<UserProfile>> {
    let viewer_id = state.viewer_id(identity.as_ref()).await?;
    let profile = state
        .user_service
        .show(
            req.user_id.as_deref(),
            req.username.as_deref(),
            viewer_id.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok(profile))
}
