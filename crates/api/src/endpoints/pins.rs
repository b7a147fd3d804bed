//! Pin endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::post,
};
use serde::{Deserialize, Serialize};
use travelboard_common::{AppError, AppResult};
use travelboard_core::{CreatePinInput, PinDetails, ReportOutcome, ReportPinInput, UpdatePinInput};
use travelboard_db::entities::pin;

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
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/upload", post(upload))
        .route("/like", post(like))
        .route("/save", post(save))
        .route("/report", post(report))
        .route("/liked", post(liked))
        .route("/saved", post(saved))
        .route("/user-pins", post(user_pins))
}

// ==================== Request/Response Types ====================

/// Request addressing one pin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinIdRequest {
    pub pin_id: String,
}

/// Paged list of the caller's liked or saved pins.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Pins created by one user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPinsRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Like toggle result.
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
}

/// Save toggle result.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: bool,
}

/// Stored image, ready to be set as a pin's `imageUrl`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub md5: String,
}

// ==================== Handlers ====================

async fn create(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<CreatePinInput>,
) -> AppResult<ApiResponse<PinDetails>> {
    let user = state.acting_user(&identity).await?;
    let pin = state.pin_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(pin))
}

async fn show(
    MaybeAuthIdentity(identity): MaybeAuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<PinIdRequest>,
) -> AppResult<ApiResponse<PinDetails>> {
    let viewer_id = state.viewer_id(identity.as_ref()).await?;
    let pin = state
        .pin_service
        .show(&req.pin_id, viewer_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(pin))
}

async fn update(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<UpdatePinInput>,
) -> AppResult<ApiResponse<pin::Model>> {
    let user = state.acting_user(&identity).await?;
    let pin = state.pin_service.update(&user.id, input).await?;
    Ok(ApiResponse::ok(pin))
}

async fn delete(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<PinIdRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = state.acting_user(&identity).await?;
    state.pin_service.delete(&user.id, &req.pin_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Upload a pin image (multipart field `file`).
async fn upload(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let user = state.acting_user(&identity).await?;

    let mut file: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file = Some((file_name, content_type, data.to_vec()));
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;

    let uploaded = state
        .pin_service
        .upload_image(&user.id, &file_name, &content_type, &data)
        .await?;

    Ok(ApiResponse::ok(UploadResponse {
        url: uploaded.url,
        size: uploaded.size,
        content_type: uploaded.content_type,
        md5: uploaded.md5,
    }))
}

async fn like(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<PinIdRequest>,
) -> AppResult<ApiResponse<LikeResponse>> {
    let user = state.acting_user(&identity).await?;
    let liked = state.social_service.toggle_like(&user.id, &req.pin_id).await?;
    Ok(ApiResponse::ok(LikeResponse { liked }))
}

async fn save(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<PinIdRequest>,
) -> AppResult<ApiResponse<SaveResponse>> {
    let user = state.acting_user(&identity).await?;
    let saved = state.social_service.toggle_save(&user.id, &req.pin_id).await?;
    Ok(ApiResponse::ok(SaveResponse { saved }))
}

async fn report(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<ReportPinInput>,
) -> AppResult<ApiResponse<ReportOutcome>> {
    let user = state.acting_user(&identity).await?;
    let outcome = state.social_service.report(&user.id, input).await?;
    Ok(ApiResponse::ok(outcome))
}

async fn liked(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Vec<pin::Model>>> {
    let user = state.acting_user(&identity).await?;
    let pins = state
        .social_service
        .liked_pins(&user.id, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(pins))
}

async fn saved(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Vec<pin::Model>>> {
    let user = state.acting_user(&identity).await?;
    let pins = state
        .social_service
        .saved_pins(&user.id, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(pins))
}

async fn user_pins(
    State(state): State<AppState>,
    Json(req): Json<UserPinsRequest>,
) -> AppResult<ApiResponse<Vec<pin::Model>>> {
    let pins = state
        .pin_service
        .list_by_user(&req.user_id, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(pins))
}
