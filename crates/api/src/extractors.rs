//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use travelboard_common::AppError;
use travelboard_core::Identity;

/// Authenticated caller. Rejects with 401 when the request carried no valid
/// token.
#[derive(Debug, Clone)]
pub struct AuthIdentity(pub Identity);

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthIdentity)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional caller, for endpoints that anonymous visitors may read.
#[derive(Debug, Clone)]
pub struct MaybeAuthIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeAuthIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Identity>().cloned()))
    }
}
