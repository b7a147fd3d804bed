//! Search endpoint.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use travelboard_common::AppResult;
use travelboard_core::{SearchResults, SearchType};

use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/search", post(search))
}

/// Search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, rename = "type")]
    pub search_type: SearchType,
}

/// Search pins, users, public boards and tags.
async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> AppResult<ApiResponse<SearchResults>> {
    let results = state
        .search_service
        .search(&req.query, req.search_type)
        .await?;
    Ok(ApiResponse::ok(results))
}
