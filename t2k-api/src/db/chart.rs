//! Chart listing query

use sqlx::SqlitePool;
use t2k_common::{ArtistId, Result, SongId};

use crate::catalog::chart::ChartRow;

/// One year's chart with last year's position, ordered by position
pub async fn chart_rows_for_year(
    pool: &SqlitePool,
    year: i32,
    artist_id: Option<ArtistId>,
    song_id: Option<SongId>,
) -> Result<Vec<ChartRow>> {
    let rows = sqlx::query_as::<_, ChartRow>(
        r#"
        SELECT e.song_id, e.year, e.position,
               p.position AS position_last_year,
               p.position - e.position AS difference,
               s.title, s.artist_id, a.name AS artist_name, s.release_year, s.img_url
        FROM chart_entries e
        JOIN songs s ON s.song_id = e.song_id
        JOIN artists a ON a.artist_id = s.artist_id
        LEFT JOIN chart_entries p ON p.song_id = e.song_id AND p.year = e.year - 1
        WHERE e.year = ?1
          AND (?2 IS NULL OR s.artist_id = ?2)
          AND (?3 IS NULL OR e.song_id = ?3)
        ORDER BY e.position
        "#,
    )
    .bind(year)
    .bind(artist_id)
    .bind(song_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
