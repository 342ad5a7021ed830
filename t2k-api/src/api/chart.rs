//! Ranked chart listing endpoint

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::catalog::chart::{empty_listing_message, shape_listing, ChartQuery, ChartRow};
use crate::stats::reconcile::check_year;
use crate::{db, ApiError, ApiResult, AppState};

/// GET /top2000/:year?artistId&songId&sort&limit
///
/// `sort` is `artist`, `title`, `release` or (default) position.
pub async fn get_chart(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Json<Vec<ChartRow>>> {
    let range = state.source.min_max_years().await?;
    check_year(range, year)?;

    let rows = db::chart_rows_for_year(&state.db, year, query.artist_id, query.song_id).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(empty_listing_message(year, &query)));
    }

    Ok(Json(shape_listing(rows, &query)))
}
