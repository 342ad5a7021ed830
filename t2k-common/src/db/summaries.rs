//! Precomputed chart summary tables
//!
//! `chart_rows` is a denormalized copy of `chart_entries` joined with song and
//! artist names. `song_chart_summary` holds per-song history aggregates
//! (first/last year charted, number of years charted).
//!
//! Both tables are derived data. They are rebuilt as a whole in one
//! transaction and may be absent entirely; readers must treat a missing table
//! as "summaries unavailable", not as an empty chart.
//!
//! A refresh records the `chart_data_version` it was built from under
//! `chart_summaries_version`. Any later chart edit bumps the data version (see
//! [`super::create_chart_version_triggers`]), after which the summaries count
//! as stale until the next refresh.

use super::CHART_DATA_VERSION_KEY;
use crate::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

/// Settings key holding the data version the summaries were built from
pub const CHART_SUMMARIES_VERSION_KEY: &str = "chart_summaries_version";

/// Row counts written by a summary refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    pub chart_rows: i64,
    pub songs: i64,
}

/// Rebuild `chart_rows` and `song_chart_summary` from the base tables
pub async fn refresh_chart_summaries(pool: &SqlitePool) -> Result<SummaryCounts> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chart_rows (
            song_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            position INTEGER NOT NULL,
            release_year INTEGER,
            title TEXT NOT NULL,
            artist_id INTEGER NOT NULL,
            artist_name TEXT NOT NULL,
            PRIMARY KEY (song_id, year)
        )
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chart_rows_year ON chart_rows(year, position)")
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_chart_summary (
            song_id INTEGER PRIMARY KEY,
            first_year INTEGER NOT NULL,
            last_year INTEGER NOT NULL,
            years_charted INTEGER NOT NULL
        )
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM chart_rows").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM song_chart_summary").execute(&mut *tx).await?;

    let chart_rows = sqlx::query(
        r#"
        INSERT INTO chart_rows (song_id, year, position, release_year, title, artist_id, artist_name)
        SELECT e.song_id, e.year, e.position, s.release_year, s.title, a.artist_id, a.name
        FROM chart_entries e
        JOIN songs s ON s.song_id = e.song_id
        JOIN artists a ON a.artist_id = s.artist_id
        "#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected() as i64;

    let songs = sqlx::query(
        r#"
        INSERT INTO song_chart_summary (song_id, first_year, last_year, years_charted)
        SELECT song_id, MIN(year), MAX(year), COUNT(DISTINCT year)
        FROM chart_entries
        GROUP BY song_id
        "#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected() as i64;

    sqlx::query(
        "INSERT OR REPLACE INTO settings (key, value) SELECT ?, value FROM settings WHERE key = ?",
    )
    .bind(CHART_SUMMARIES_VERSION_KEY)
    .bind(CHART_DATA_VERSION_KEY)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Chart summaries refreshed: {} chart rows, {} songs",
        chart_rows, songs
    );

    Ok(SummaryCounts { chart_rows, songs })
}

/// Remove the summary tables (readers fall back to the base tables)
pub async fn drop_chart_summaries(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS chart_rows").execute(pool).await?;
    sqlx::query("DROP TABLE IF EXISTS song_chart_summary")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(CHART_SUMMARIES_VERSION_KEY)
        .execute(pool)
        .await?;
    info!("Chart summaries dropped");
    Ok(())
}

/// True when both summary tables exist
pub async fn chart_summaries_present(pool: &SqlitePool) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('chart_rows', 'song_chart_summary')",
    )
    .fetch_one(pool)
    .await?;

    Ok(count == 2)
}

/// True when the last refresh saw the current chart data
pub async fn chart_summaries_current(pool: &SqlitePool) -> Result<bool> {
    let matches: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT (SELECT value FROM settings WHERE key = ?1)
             = (SELECT value FROM settings WHERE key = ?2)
        "#,
    )
    .bind(CHART_SUMMARIES_VERSION_KEY)
    .bind(CHART_DATA_VERSION_KEY)
    .fetch_one(pool)
    .await?;

    Ok(matches == Some(1))
}

/// Fail with [`Error::Stale`] unless the summaries match the chart data
pub async fn ensure_chart_summaries_current(pool: &SqlitePool) -> Result<()> {
    if chart_summaries_current(pool).await? {
        Ok(())
    } else {
        Err(Error::Stale(
            "chart summaries predate the latest chart changes".to_string(),
        ))
    }
}
