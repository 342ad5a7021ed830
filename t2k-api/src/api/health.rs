//! Service status endpoints: health check and build identification

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Earliest and latest loaded chart year
#[derive(Debug, Serialize)]
pub struct ChartYears {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok`, or `no_data` while the chart tables are empty or unreadable
    pub status: String,
    pub module: String,
    pub version: String,
    pub chart_years: Option<ChartYears>,
}

/// GET /health
///
/// Never fails; an unreadable chart source is reported as `no_data`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let range = match state.source.min_max_years().await {
        Ok(range) => range,
        Err(e) => {
            warn!("Health check could not read chart years: {}", e);
            None
        }
    };

    Json(HealthResponse {
        status: if range.is_some() { "ok" } else { "no_data" }.to_string(),
        module: "t2k-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chart_years: range.map(|(min, max)| ChartYears { min, max }),
    })
}

/// Build identification captured by `build.rs`
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}

/// Routes that need no authentication and no request parameters
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/buildinfo", get(get_build_info))
}
