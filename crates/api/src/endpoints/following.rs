//! Follow graph endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use travelboard_common::AppResult;
use travelboard_core::UserSummary;

use super::default_limit;
use crate::{extractors::AuthIdentity, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/followers", post(followers))
        .route("/following", post(following))
}

/// Toggle follow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFollowRequest {
    pub user_id: String,
}

/// List followers or followees of a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowListRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Follow toggle result.
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub following: bool,
}

async fn toggle(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ToggleFollowRequest>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let user = state.acting_user(&identity).await?;
    let following = state
        .social_service
        .toggle_follow(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(FollowResponse { following }))
}

async fn followers(
    State(state): State<AppState>,
    Json(req): Json<FollowListRequest>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state
        .social_service
        .followers(&req.user_id, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(users))
}

async fn following(
    State(state): State<AppState>,
    Json(req): Json<FollowListRequest>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state
        .social_service
        .following(&req.user_id, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(users))
}
