//! Trip timeline endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use travelboard_common::AppResult;
use travelboard_core::{CreateDayInput, TimelineDayView, UpdateDayInput};
use travelboard_db::entities::{timeline_day, timeline_pin};

use crate::{
    extractors::{AuthIdentity, MaybeAuthIdentity},
    middleware::AppState,
    response::ApiResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/create-day", post(create_day))
        .route("/update-day", post(update_day))
        .route("/delete-day", post(delete_day))
        .route("/assign", post(assign))
        .route("/unassign", post(unassign))
        .route("/reorder", post(reorder))
}

/// List timeline request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTimelineRequest {
    pub board_id: String,
}

/// Request addressing one day.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayIdRequest {
    pub day_id: String,
}

/// Assign or unassign a pin on a day.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPinRequest {
    pub day_id: String,
    pub pin_id: String,
}

/// Reorder a day. `timelinePinIds` are assignment IDs, first to last.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderDayRequest {
    pub day_id: String,
    pub timeline_pin_ids: Vec<String>,
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
    Json(req): Json<ListTimelineRequest>,
) -> AppResult<ApiResponse<Vec<TimelineDayView>>> {
    let viewer_id = state.viewer_id(identity.as_ref()).await?;
    let days = state
        .timeline_service
        .list(&req.board_id, viewer_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(days))
}

async fn create_day(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<CreateDayInput>,
) -> AppResult<ApiResponse<timeline_day::Model>> {
    let user = state.acting_user(&identity).await?;
    let day = state.timeline_service.create_day(&user.id, input).await?;
    Ok(ApiResponse::ok(day))
}

async fn update_day(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<UpdateDayInput>,
) -> AppResult<ApiResponse<timeline_day::Model>> {
    let user = state.acting_user(&identity).await?;
    let day = state.timeline_service.update_day(&user.id, input).await?;
    Ok(ApiResponse::ok(day))
}

async fn delete_day(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<DayIdRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = state.acting_user(&identity).await?;
    state.timeline_service.delete_day(&user.id, &req.day_id).await?;
    Ok(ApiResponse::ok(()))
}

async fn assign(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<DayPinRequest>,
) -> AppResult<ApiResponse<timeline_pin::Model>> {
    let user = state.acting_user(&identity).await?;
    let assignment = state
        .timeline_service
        .assign(&user.id, &req.day_id, &req.pin_id)
        .await?;
    Ok(ApiResponse::ok(assignment))
}

async fn unassign(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<DayPinRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = state.acting_user(&identity).await?;
    state
        .timeline_service
        .unassign(&user.id, &req.day_id, &req.pin_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn reorder(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ReorderDayRequest>,
) -> AppResult<ApiResponse<ReorderResponse>> {
    let user = state.acting_user(&identity).await?;
    let reordered = state
        .timeline_service
        .reorder(&user.id, &req.day_id, &req.timeline_pin_ids)
        .await?;
    Ok(ApiResponse::ok(ReorderResponse { reordered }))
}
