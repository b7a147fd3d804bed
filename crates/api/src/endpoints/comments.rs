//! Board comment endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use travelboard_common::AppResult;
use travelboard_core::{CommentView, CreateCommentInput};
use travelboard_db::entities::board_comment;

use super::default_limit;
use crate::{
    extractors::{AuthIdentity, MaybeAuthIdentity},
    middleware::AppState,
    response::ApiResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/list", post(list))
        .route("/delete", post(delete))
        .route("/pin", post(pin))
        .route("/unpin", post(unpin))
        .route("/react", post(react))
}

/// List comments request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    pub board_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Request addressing one comment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentIdRequest {
    pub comment_id: String,
}

/// Toggle a reaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactRequest {
    pub comment_id: String,
    pub emoji: String,
}

/// Reaction toggle result.
#[derive(Debug, Serialize)]
pub struct ReactResponse {
    pub reacted: bool,
}

async fn create(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<board_comment::Model>> {
    let user = state.acting_user(&identity).await?;
    let comment = state.comment_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(comment))
}

async fn list(
    MaybeAuthIdentity(identity): MaybeAuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ListCommentsRequest>,
) -> AppResult<ApiResponse<Vec<CommentView>>> {
    let viewer_id = state.viewer_id(identity.as_ref()).await?;
    let comments = state
        .comment_service
        .list(&req.board_id, viewer_id.as_deref(), req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(comments))
}

async fn delete(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = state.acting_user(&identity).await?;
    state.comment_service.delete(&user.id, &req.comment_id).await?;
    Ok(ApiResponse::ok(()))
}

async fn pin(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = state.acting_user(&identity).await?;
    state
        .comment_service
        .set_pinned(&user.id, &req.comment_id, true)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn unpin(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = state.acting_user(&identity).await?;
    state
        .comment_service
        .set_pinned(&user.id, &req.comment_id, false)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn react(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ReactRequest>,
) -> AppResult<ApiResponse<ReactResponse>> {
    let user = state.acting_user(&identity).await?;
    let reacted = state
        .comment_service
        .react(&user.id, &req.comment_id, &req.emoji)
        .await?;
    Ok(ApiResponse::ok(ReactResponse { reacted }))
}
