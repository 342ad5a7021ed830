//! Chart queries over the base tables (`chart_entries`, `songs`, `artists`)

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use t2k_common::{Result, SongId};

use super::{placeholders, ChartDataSource};
use crate::models::{BasicSongRecord, ChartEntry, OneHitRecord};

/// Always-available data source joining the normalized tables
#[derive(Clone)]
pub struct RelationalChartSource {
    db: SqlitePool,
}

impl RelationalChartSource {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChartDataSource for RelationalChartSource {
    async fn min_max_years(&self) -> Result<Option<(i32, i32)>> {
        let (min, max): (Option<i32>, Option<i32>) =
            sqlx::query_as("SELECT MIN(year), MAX(year) FROM chart_entries")
                .fetch_one(&self.db)
                .await?;

        Ok(min.zip(max))
    }

    async fn entries_for_year(
        &self,
        year: i32,
        position_limit: Option<i32>,
    ) -> Result<Vec<ChartEntry>> {
        let entries = sqlx::query_as::<_, ChartEntry>(
            r#"
            SELECT e.song_id, e.position, e.year, s.release_year, s.title,
                   a.artist_id, a.name AS artist_name
            FROM chart_entries e
            JOIN songs s ON s.song_id = e.song_id
            JOIN artists a ON a.artist_id = s.artist_id
            WHERE e.year = ? AND (? IS NULL OR e.position <= ?)
            ORDER BY e.position
            "#,
        )
        .bind(year)
        .bind(position_limit)
        .bind(position_limit)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    async fn song_ids_charted_before(&self, year: i32) -> Result<Vec<SongId>> {
        let ids = sqlx::query_scalar::<_, SongId>(
            "SELECT DISTINCT song_id FROM chart_entries WHERE year < ?",
        )
        .bind(year)
        .fetch_all(&self.db)
        .await?;

        Ok(ids)
    }

    async fn song_ids_charted_before_among(
        &self,
        year: i32,
        ids: &[SongId],
    ) -> Result<Vec<SongId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT DISTINCT song_id FROM chart_entries WHERE year < ? AND song_id IN ({})",
            placeholders(ids.len())
        );

        let mut query = sqlx::query_scalar::<_, SongId>(&sql).bind(year);
        for id in ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.db).await?)
    }

    async fn latest_positions_before(
        &self,
        year: i32,
        ids: &[SongId],
    ) -> Result<HashMap<SongId, i32>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            r#"
            SELECT e.song_id, e.position
            FROM chart_entries e
            WHERE e.year = (
                SELECT MAX(p.year) FROM chart_entries p
                WHERE p.song_id = e.song_id AND p.year < ?
            )
            AND e.song_id IN ({})
            "#,
            placeholders(ids.len())
        );

        let mut query = sqlx::query_as::<_, (SongId, i32)>(&sql).bind(year);
        for id in ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.db).await?.into_iter().collect())
    }

    async fn all_time_classics(&self) -> Result<Vec<BasicSongRecord>> {
        let songs = sqlx::query_as::<_, BasicSongRecord>(
            r#"
            SELECT s.song_id, s.title, a.name AS artist_name, s.release_year,
                   NULL AS position, NULL AS position_last_year
            FROM songs s
            JOIN artists a ON a.artist_id = s.artist_id
            WHERE s.song_id IN (
                SELECT song_id FROM chart_entries
                GROUP BY song_id
                HAVING COUNT(DISTINCT year) = (SELECT COUNT(DISTINCT year) FROM chart_entries)
            )
            ORDER BY s.title, s.song_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(songs)
    }

    async fn one_hit_wonders(&self) -> Result<Vec<OneHitRecord>> {
        let songs = sqlx::query_as::<_, OneHitRecord>(
            r#"
            SELECT s.song_id, s.title, a.name AS artist_name, s.release_year,
                   e.position, e.year
            FROM chart_entries e
            JOIN songs s ON s.song_id = e.song_id
            JOIN artists a ON a.artist_id = s.artist_id
            WHERE e.song_id IN (
                SELECT song_id FROM chart_entries GROUP BY song_id HAVING COUNT(*) = 1
            )
            ORDER BY s.title, e.year, s.song_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(songs)
    }

    async fn reentries_for_year(
        &self,
        _year: i32,
        _top: i32,
    ) -> Result<Option<Vec<BasicSongRecord>>> {
        // Computed by the pipeline from the lookups above
        Ok(None)
    }
}
