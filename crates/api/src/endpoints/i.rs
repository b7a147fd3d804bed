//! The calling user.

use axum::{Router, extract::State, routing::post};
use travelboard_common::AppResult;
use travelboard_db::entities::user;

use crate::{extractors::AuthIdentity, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/i", post(me))
}

/// Get the caller's own account, creating it on first sign-in.
async fn me(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.acting_user(&identity).await?;
    Ok(ApiResponse::ok(user))
}
