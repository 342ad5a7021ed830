//! Artist lookup, listing and admin update endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use t2k_common::ArtistId;
use tracing::info;

use crate::catalog::artists::{
    build_artist, build_artists, sort_listing, ArtistChartRow, ArtistDetail, ArtistPatch,
    ArtistQuery, ArtistSelector, ArtistView,
};
use crate::{db, ApiError, ApiResult, AppState};

/// One artist for detail lookups, a list otherwise
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ArtistsResponse {
    Detail(ArtistDetail),
    Listing(Vec<ArtistDetail>),
}

/// GET /artists
///
/// `artistId` (or `artist`, a case-insensitive name) returns that artist's
/// detail. Without either, returns the filtered listing.
pub async fn get_artists(
    State(state): State<AppState>,
    Query(query): Query<ArtistQuery>,
) -> ApiResult<Json<ArtistsResponse>> {
    let selector = query.selector();
    let rows = db::artist_chart_rows(&state.db, &selector).await?;

    match selector {
        ArtistSelector::ById(_) | ArtistSelector::ByName(_) => {
            let refs: Vec<&ArtistChartRow> = rows.iter().collect();
            let artist = build_artist(&refs).ok_or_else(|| {
                ApiError::NotFound("Artist has no chart entries".to_string())
            })?;
            Ok(Json(ArtistsResponse::Detail(artist)))
        }
        ArtistSelector::Listing { .. } => {
            let mut artists: Vec<ArtistDetail> = build_artists(&rows)
                .into_iter()
                .filter(|a| query.matches(a))
                .collect();
            if artists.is_empty() {
                return Err(ApiError::NotFound(
                    "No artists match the given filters".to_string(),
                ));
            }
            sort_listing(&mut artists);
            Ok(Json(ArtistsResponse::Listing(artists)))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateArtistResponse {
    pub message: String,
    pub artist: ArtistView,
}

/// PUT /artists/update/:artist_id
///
/// **Request:** any of `{"wiki", "biography", "photo"}` plus `timestamp`/`hash`
///
/// **Errors:**
/// - 400 Bad Request: URL field that is not an absolute http(s) URL
/// - 404 Not Found: unknown artist
pub async fn update_artist(
    State(state): State<AppState>,
    Path(artist_id): Path<ArtistId>,
    Json(patch): Json<ArtistPatch>,
) -> ApiResult<Json<UpdateArtistResponse>> {
    let mut artist = db::load_artist(&state.db, artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Artist {} not found", artist_id)))?;

    patch.apply(&mut artist).map_err(ApiError::BadRequest)?;
    db::save_artist(&state.db, &artist).await?;

    info!("Admin updated artist {} - {}", artist.artist_id, artist.name);

    Ok(Json(UpdateArtistResponse {
        message: "Artist updated successfully".to_string(),
        artist: artist.into(),
    }))
}
