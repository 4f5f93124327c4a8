//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domains::{AppError, CallerId};

use crate::http::error::ApiError;
use crate::http::state::AppState;

/// The resolved caller identity, extracted from the `Authorization` header
/// of any mutating request. Handlers never see the raw credential.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub CallerId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("expected a Bearer token".into()))?;
        let caller = state.identity.resolve(token).await?;
        Ok(AuthUser(caller))
    }
}
