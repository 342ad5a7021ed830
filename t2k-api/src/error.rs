//! HTTP error type for t2k-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::stats::StatsError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Failed admin authentication (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No chart data loaded yet (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// t2k-common error
    #[error("Common error: {0}")]
    Common(#[from] t2k_common::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Common(err.into())
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::NoDataAvailable => ApiError::ServiceUnavailable(err.to_string()),
            StatsError::YearOutOfRange { .. } => ApiError::NotFound(err.to_string()),
            StatsError::InvalidParameter(msg) => ApiError::BadRequest(msg),
            StatsError::Source(e) => ApiError::Common(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(t2k_common::Error::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(t2k_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(ref err) => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMMON_ERROR",
                    err.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_errors_map_to_statuses() {
        let cases = [
            (StatsError::NoDataAvailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                StatsError::YearOutOfRange {
                    min_year: 1999,
                    max_year: 2024,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                StatsError::InvalidParameter("top".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                StatsError::Source(t2k_common::Error::Internal("both paths failed".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_year_range_in_message() {
        let err = ApiError::from(StatsError::YearOutOfRange {
            min_year: 1999,
            max_year: 2024,
        });
        assert!(err.to_string().contains("1999-2024"));
    }
}
