//! Artist queries and updates

use sqlx::SqlitePool;
use t2k_common::{ArtistId, Result};

use crate::catalog::artists::{ArtistChartRow, ArtistRecord, ArtistSelector};

const ARTIST_ROWS: &str = r#"
    SELECT a.artist_id, a.name AS artist_name, a.wiki, a.biography, a.photo,
           s.song_id, s.title, s.release_year, s.img_url, e.position
    FROM chart_entries e
    JOIN songs s ON s.song_id = e.song_id
    JOIN artists a ON a.artist_id = s.artist_id
"#;

/// Chart rows for one artist or for the listing, oldest year first
pub async fn artist_chart_rows(
    pool: &SqlitePool,
    selector: &ArtistSelector,
) -> Result<Vec<ArtistChartRow>> {
    let order = "ORDER BY e.year, e.position";

    let rows = match selector {
        ArtistSelector::ById(artist_id) => {
            let sql = format!("{} WHERE a.artist_id = ? {}", ARTIST_ROWS, order);
            sqlx::query_as::<_, ArtistChartRow>(&sql)
                .bind(*artist_id)
                .fetch_all(pool)
                .await?
        }
        ArtistSelector::ByName(name) => {
            let sql = format!("{} WHERE LOWER(TRIM(a.name)) = LOWER(?) {}", ARTIST_ROWS, order);
            sqlx::query_as::<_, ArtistChartRow>(&sql)
                .bind(name)
                .fetch_all(pool)
                .await?
        }
        ArtistSelector::Listing { year, contains } => {
            let sql = format!(
                "{} WHERE (?1 IS NULL OR e.year = ?1) \
                 AND (?2 IS NULL OR INSTR(LOWER(a.name), LOWER(?2)) > 0) {}",
                ARTIST_ROWS, order
            );
            sqlx::query_as::<_, ArtistChartRow>(&sql)
                .bind(*year)
                .bind(contains.as_deref())
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows)
}

pub async fn load_artist(pool: &SqlitePool, artist_id: ArtistId) -> Result<Option<ArtistRecord>> {
    let artist = sqlx::query_as::<_, ArtistRecord>(
        "SELECT artist_id, name, wiki, biography, photo FROM artists WHERE artist_id = ?",
    )
    .bind(artist_id)
    .fetch_optional(pool)
    .await?;

    Ok(artist)
}

/// Write the editable fields of `artist`
pub async fn save_artist(pool: &SqlitePool, artist: &ArtistRecord) -> Result<()> {
    sqlx::query("UPDATE artists SET wiki = ?, biography = ?, photo = ? WHERE artist_id = ?")
        .bind(&artist.wiki)
        .bind(&artist.biography)
        .bind(&artist.photo)
        .bind(artist.artist_id)
        .execute(pool)
        .await?;

    Ok(())
}
