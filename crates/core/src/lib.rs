//! Core business logic for travelboard.
//!
//! Services sit between the HTTP layer and the repositories. Every
//! board-scoped operation resolves the caller's capabilities first, then
//! mutates, then records activity.

pub mod services;

pub use services::*;
