//! Endpoints for the ordered pin collection of a board.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use travelboard_common::AppResult;
use travelboard_core::{AddBoardPinInput, BoardPinEntry, UpdateBoardPinInput};
use travelboard_db::entities::board_pin;

use crate::{
    extractors::{AuthIdentity, MaybeAuthIdentity},
    middleware::AppState,
    response::ApiResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/add", post(add))
        .route("/remove", post(remove))
        .route("/reorder", post(reorder))
        .route("/update", post(update))
}

/// List board pins request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBoardPinsRequest {
    pub board_id: String,
}

/// Remove a pin from a board.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBoardPinRequest {
    pub board_id: String,
    pub pin_id: String,
}

/// Reorder request. `boardPinIds` are relation IDs, first to last.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBoardPinsRequest {
    pub board_id: String,
    pub board_pin_ids: Vec<String>,
}

/// Reorder result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderResponse {
    pub reordered: u64,
}

async fn list(
    MaybeAuthIdentity(identity): MaybeAuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ListBoardPinsRequest>,
) -> AppResult<ApiResponse<Vec<BoardPinEntry>>> {
    let viewer_id = state.viewer_id(identity.as_ref()).await?;
    let entries = state
        .board_pin_service
        .list(&req.board_id, viewer_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(entries))
}

async fn add(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<AddBoardPinInput>,
) -> AppResult<ApiResponse<board_pin::Model>> {
    let user = state.acting_user(&identity).await?;
    let relation = state.board_pin_service.add(&user.id, input).await?;
    Ok(ApiResponse::ok(relation))
}

async fn remove(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<RemoveBoardPinRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = state.acting_user(&identity).await?;
    state
        .board_pin_service
        .remove(&user.id, &req.board_id, &req.pin_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn reorder(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ReorderBoardPinsRequest>,
) -> AppResult<ApiResponse<ReorderResponse>> {
    let user = state.acting_user(&identity).await?;
    let reordered = state
        .board_pin_service
        .reorder(&user.id, &req.board_id, &req.board_pin_ids)
        .await?;
    Ok(ApiResponse::ok(ReorderResponse { reordered }))
}

async fn update(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<UpdateBoardPinInput>,
) -> AppResult<ApiResponse<board_pin::Model>> {
    let user = state.acting_user(&identity).await?;
    let relation = state.board_pin_service.update(&user.id, input).await?;
    Ok(ApiResponse::ok(relation))
}
