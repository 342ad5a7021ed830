//! Song queries and updates

use sqlx::SqlitePool;
use t2k_common::{Result, SongId};

use crate::catalog::songs::{ChartPoint, SongListItem, SongRecord};

pub async fn load_song(pool: &SqlitePool, song_id: SongId) -> Result<Option<SongRecord>> {
    let song = sqlx::query_as::<_, SongRecord>(
        r#"
        SELECT s.song_id, s.artist_id, s.title, a.name AS artist_name, s.release_year,
               s.img_url, s.lyrics, s.youtube,
               a.photo AS artist_photo, a.biography AS artist_biography
        FROM songs s
        JOIN artists a ON a.artist_id = s.artist_id
        WHERE s.song_id = ?
        "#,
    )
    .bind(song_id)
    .fetch_optional(pool)
    .await?;

    Ok(song)
}

/// Every chart position of a song, oldest year first
pub async fn chart_history(pool: &SqlitePool, song_id: SongId) -> Result<Vec<ChartPoint>> {
    let points = sqlx::query_as::<_, ChartPoint>(
        "SELECT year, position FROM chart_entries WHERE song_id = ? ORDER BY year",
    )
    .bind(song_id)
    .fetch_all(pool)
    .await?;

    Ok(points)
}

pub async fn all_songs(pool: &SqlitePool) -> Result<Vec<SongListItem>> {
    let songs = sqlx::query_as::<_, SongListItem>(
        r#"
        SELECT s.song_id, s.title, a.name AS artist_name, s.release_year, s.img_url, s.youtube
        FROM songs s
        JOIN artists a ON a.artist_id = s.artist_id
        ORDER BY s.song_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(songs)
}

/// Write the editable media fields of `song`
pub async fn save_song_media(pool: &SqlitePool, song: &SongRecord) -> Result<()> {
    sqlx::query("UPDATE songs SET img_url = ?, lyrics = ?, youtube = ? WHERE song_id = ?")
        .bind(&song.img_url)
        .bind(&song.lyrics)
        .bind(&song.youtube)
        .bind(song.song_id)
        .execute(pool)
        .await?;

    Ok(())
}
