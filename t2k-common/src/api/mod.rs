//! Shared HTTP API functionality
//!
//! Contains only pure functions and database operations; the axum middleware
//! wrapping them lives in `t2k-api`.

pub mod auth;

pub use auth::{
    calculate_hash, now_millis, sign_body, to_canonical_json, validate_hash, validate_timestamp,
    verify_signed_body, ApiAuthError,
};

#[cfg(feature = "sqlx")]
pub use auth::{initialize_shared_secret, load_shared_secret};
