//! Song detail, song list and admin update endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use t2k_common::SongId;
use tracing::info;

use crate::catalog::songs::{SongDetail, SongDetailQuery, SongListItem, SongPatch, SongView};
use crate::{db, ApiError, ApiResult, AppState};

/// GET /song/details?id=
pub async fn get_song_detail(
    State(state): State<AppState>,
    Query(query): Query<SongDetailQuery>,
) -> ApiResult<Json<SongDetail>> {
    let song = db::load_song(&state.db, query.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song {} not found", query.id)))?;
    let history = db::chart_history(&state.db, query.id).await?;

    Ok(Json(SongDetail::new(song, history)))
}

/// GET /song/getallsongs
pub async fn get_all_songs(State(state): State<AppState>) -> ApiResult<Json<Vec<SongListItem>>> {
    Ok(Json(db::all_songs(&state.db).await?))
}

#[derive(Debug, Serialize)]
pub struct UpdateSongResponse {
    pub message: String,
    pub song: SongView,
}

/// PUT /song/update/:song_id
///
/// **Request:** any of `{"imgUrl", "lyrics", "youtube"}` plus `timestamp`/`hash`
///
/// **Errors:**
/// - 400 Bad Request: URL field that is not an absolute http(s) URL
/// - 404 Not Found: unknown song
pub async fn update_song(
    State(state): State<AppState>,
    Path(song_id): Path<SongId>,
    Json(patch): Json<SongPatch>,
) -> ApiResult<Json<UpdateSongResponse>> {
    let mut song = db::load_song(&state.db, song_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song {} not found", song_id)))?;

    patch.apply(&mut song).map_err(ApiError::BadRequest)?;
    db::save_song_media(&state.db, &song).await?;

    info!("Admin updated song {} - {}", song.song_id, song.title);

    Ok(Json(UpdateSongResponse {
        message: "Song updated successfully".to_string(),
        song: song.into(),
    }))
}
