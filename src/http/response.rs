//! Response mapping for engine and extraction errors.
//!
//! # Responsibilities
//! - Map each `PoolingError` kind to its status code
//! - Log rejected requests at `warn`
//!
//! # Design Decisions
//! - Bodies are plain text; the status code alone carries the error kind

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::pooling::PoolingError;

/// Anything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pooling(#[from] PoolingError),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Extractor rejection that keeps its own status (e.g. body too large).
    #[error("{1}")]
    Rejected(StatusCode, String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pooling(PoolingError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Pooling(
                PoolingError::InvalidCapacity(_)
                | PoolingError::DuplicateId(_)
                | PoolingError::InvalidArgument(_),
            ) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(status, _) => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = %status, error = %self, "Request rejected");
        (status, self.to_string()).into_response()
    }
}
