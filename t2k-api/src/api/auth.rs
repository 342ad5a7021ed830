//! Authentication middleware for admin routes
//!
//! Admin request bodies carry `timestamp` and `hash` next to the edited
//! fields (see `t2k_common::api::auth`). The body is checked here and handed
//! on unchanged.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use t2k_common::api::{now_millis, verify_signed_body, ApiAuthError};
use tracing::warn;

use crate::{ApiError, AppState};

/// Largest admin body accepted
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Validate timestamp and hash of the request body
///
/// A shared secret of `0` disables checking entirely.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.shared_secret == 0 {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read body: {}", e)))?;

    let json_value: Value = serde_json::from_slice(&body_bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))?;

    verify_signed_body(&json_value, state.shared_secret, now_millis()).map_err(|e| match e {
        ApiAuthError::InvalidHash {
            provided,
            calculated,
        } => {
            warn!(
                "Hash validation failed on {}: provided={}, calculated={}",
                parts.uri.path(),
                provided,
                calculated
            );
            ApiError::Unauthorized("Invalid hash".to_string())
        }
        ApiAuthError::InvalidTimestamp { reason, .. } => {
            ApiError::Unauthorized(format!("Invalid timestamp: {}", reason))
        }
        ApiAuthError::MissingTimestamp | ApiAuthError::MissingHash | ApiAuthError::ParseError(_) => {
            ApiError::BadRequest(e.to_string())
        }
        ApiAuthError::DatabaseError(_) => ApiError::Internal(e.to_string()),
    })?;

    // Reconstruct request with restored body for downstream handlers
    let request = Request::from_parts(parts, Body::from(body_bytes));
    Ok(next.run(request).await)
}
