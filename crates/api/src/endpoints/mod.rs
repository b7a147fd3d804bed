//! API endpoints.

mod board_pins;
mod boards;
mod comments;
mod following;
mod i;
mod members;
mod pins;
mod search;
mod tags;
mod timeline;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(i::router())
        .nest("/users", users::router())
        .nest("/boards", boards::router())
        .nest("/boards/members", members::router())
        .nest("/boards/pins", board_pins::router())
        .nest("/boards/timeline", timeline::router())
        .nest("/boards/comments", comments::router())
        .nest("/pins", pins::router())
        .nest("/following", following::router())
        .merge(search::router())
        .nest("/tags", tags::router())
}

/// Default page size for list endpoints.
const fn default_limit() -> u64 {
    20
}
