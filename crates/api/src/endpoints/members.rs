//! Board membership endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use travelboard_common::AppResult;
use travelboard_core::{AddMemberInput, MemberEntry};
use travelboard_db::entities::board_member::{self, BoardRole};

use crate::{
    extractors::{AuthIdentity, MaybeAuthIdentity},
    middleware::AppState,
    response::ApiResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/add", post(add))
        .route("/update", post(update))
        .route("/remove", post(remove))
}

/// List members request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersRequest {
    pub board_id: String,
}

/// Change role request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub board_id: String,
    pub user_id: String,
    pub role: BoardRole,
}

/// Remove member request. Members may pass their own ID to leave.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMemberRequest {
    pub board_id: String,
    pub user_id: String,
}

async fn list(
    MaybeAuthIdentity(identity): MaybeAuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<ListMembersRequest>,
) -> AppResult<ApiResponse<Vec<MemberEntry>>> {
    let viewer_id = state.viewer_id(identity.as_ref()).await?;
    let members = state
        .member_service
        .list(&req.board_id, viewer_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(members))
}

async fn add(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<AddMemberInput>,
) -> AppResult<ApiResponse<board_member::Model>> {
    let user = state.acting_user(&identity).await?;
    let member = state.member_service.add(&user.id, input).await?;
    Ok(ApiResponse::ok(member))
}

async fn update(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<UpdateMemberRequest>,
) -> AppResult<ApiResponse<board_member::Model>> {
    let user = state.acting_user(&identity).await?;
    let member = state
        .member_service
        .change_role(&user.id, &req.board_id, &req.user_id, req.role)
        .await?;
    Ok(ApiResponse::ok(member))
}

async fn remove(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<RemoveMemberRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = state.acting_user(&identity).await?;
    state
        .member_service
        .remove(&user.id, &req.board_id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}
