//! Year-over-year statistics endpoint

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::models::StatisticsReport;
use crate::stats::{compute_statistics, DEFAULT_TOP, DEFAULT_TOP_ARTISTS};
use crate::{ApiResult, AppState};

/// Query string of `/statistieken/:year`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    pub top: Option<i32>,
    pub top_artists: Option<i32>,
}

/// GET /statistieken/:year?top=10&topArtists=3
///
/// **Errors:**
/// - 400 Bad Request: `top < 1` or `topArtists < 0`
/// - 404 Not Found: year outside the known chart range
/// - 503 Service Unavailable: no chart data loaded
pub async fn get_statistics(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<StatisticsQuery>,
) -> ApiResult<Json<StatisticsReport>> {
    let report = compute_statistics(
        state.source.as_ref(),
        year,
        query.top.unwrap_or(DEFAULT_TOP),
        query.top_artists.unwrap_or(DEFAULT_TOP_ARTISTS),
    )
    .await?;

    Ok(Json(report))
}
