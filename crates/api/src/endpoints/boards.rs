//! Board endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use travelboard_common::AppResult;
use travelboard_core::{BoardDetails, CreateBoardInput, UpdateBoardInput};
use travelboard_db::entities::{board, board_activity};

use super::default_limit;
use crate::{
    extractors::{AuthIdentity, MaybeAuthIdentity},
    middleware::AppState,
    response::ApiResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/shared", post(shared))
        .route("/update", post(update))
        .route("/archive", post(archive))
        .route("/restore", post(restore))
        .route("/delete", post(delete))
        .route("/activity", post(activity))
}

// ==================== Request Types ====================

/// Request addressing one board.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardIdRequest {
    pub board_id: String,
}

/// List my boards request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBoardsRequest {
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Paged request without filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Board activity request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    pub board_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

// ==================== Handlers ====================

/// Create a board owned by the caller.
async fn create(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<CreateBoardInput>,
) -> AppResult<ApiResponse<board::Model>> {
    let user = state.acting_user(&identity).await?;
    let board = state.board_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(board))
}

/// Show a board with the caller's permissions.
async fn show(
    MaybeAuthIdentity(identity): MaybeAuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<BoardIdRequest>,
) -> AppResult<ApiResponse<BoardDetails>> {
    let viewer_id = state.viewer_id(identity.as_ref()).await?;
    let details = state
        .board_service
        .show(&req.board_id, viewer_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(details))
}

/// List boards the caller owns.
async fn list(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ListBoardsRequest>,
) -> AppResult<ApiResponse<Vec<board::Model>>> {
    let user = state.acting_user(&identity).await?;
    let boards = state
        .board_service
        .list_mine(&user.id, req.include_archived, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(boards))
}

/// List boards shared with the caller.
async fn shared(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Vec<board::Model>>> {
    let user = state.acting_user(&identity).await?;
    let boards = state
        .board_service
        .list_shared(&user.id, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(boards))
}

/// Update board settings.
async fn update(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<UpdateBoardInput>,
) -> AppResult<ApiResponse<board::Model>> {
    let user = state.acting_user(&identity).await?;
    let board = state.board_service.update(&user.id, input).await?;
    Ok(ApiResponse::ok(board))
}

/// Archive a board.
async fn archive(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<BoardIdRequest>,
) -> AppResult<ApiResponse<board::Model>> {
    let user = state.acting_user(&identity).await?;
    let board = state.board_service.archive(&user.id, &req.board_id).await?;
    Ok(ApiResponse::ok(board))
}

/// Restore an archived board.
async fn restore(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<BoardIdRequest>,
) -> AppResult<ApiResponse<board::Model>> {
    let user = state.acting_user(&identity).await?;
    let board = state.board_service.restore(&user.id, &req.board_id).await?;
    Ok(ApiResponse::ok(board))
}

/// Delete a board and everything attached to it.
async fn delete(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<BoardIdRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = state.acting_user(&identity).await?;
    state.board_service.delete(&user.id, &req.board_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Board activity log, newest first.
async fn activity(
    MaybeAuthIdentity(identity): MaybeAuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ActivityRequest>,
) -> AppResult<ApiResponse<Vec<board_activity::Model>>> {
    let viewer_id = state.viewer_id(identity.as_ref()).await?;
    let entries = state
        .activity_service
        .list(&req.board_id, viewer_id.as_deref(), req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(entries))
}
