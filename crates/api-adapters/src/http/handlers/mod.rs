pub mod answers;
pub mod comments;
pub mod posts;

use domains::{AppError, VoteDirection};

use crate::http::error::ApiError;

/// Shared vote request body: `{"vote": 1}` or `{"vote": -1}`.
#[derive(Debug, serde::Deserialize)]
pub struct VoteRequest {
    pub vote: i8,
}

pub(crate) fn parse_direction(raw: i8) -> Result<VoteDirection, ApiError> {
    VoteDirection::try_from(raw).map_err(|e| ApiError(AppError::Validation(e)))
}
