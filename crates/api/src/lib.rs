//! HTTP API layer for travelboard.
//!
//! This crate exposes the board engine over JSON:
//!
//! - **Endpoints**: `POST` routes grouped by resource (`/boards/*`, `/pins/*`, ...)
//! - **Extractors**: the caller's [`Identity`](travelboard_core::Identity), required or optional
//! - **Middleware**: bearer-token authentication against the identity provider
//!
//! Built on Axum 0.8. Success bodies are `{"data": ...}`; failures are
//! rendered by [`AppError`](travelboard_common::AppError).

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
