//! Tag endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use travelboard_common::AppResult;
use travelboard_db::repositories::TagWithCount;

use super::default_limit;
use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/popular", post(popular))
}

/// Popular tags request.
#[derive(Debug, Deserialize)]
pub struct PopularTagsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Tags ordered by how many pins carry them.
async fn popular(
    State(state): State<AppState>,
    Json(req): Json<PopularTagsRequest>,
) -> AppResult<ApiResponse<Vec<TagWithCount>>> {
    let tags = state.pin_service.popular_tags(req.limit).await?;
    Ok(ApiResponse::ok(tags))
}
