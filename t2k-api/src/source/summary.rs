//! Chart queries over the precomputed summary tables
//!
//! Reads `chart_rows` and `song_chart_summary` (see
//! `t2k_common::db::refresh_chart_summaries`). When those tables are missing
//! every query fails with a database error, and when chart data changed since
//! the last refresh every query fails with `Error::Stale`.
//! [`super::FallbackChartSource`] turns either into a relational query.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use t2k_common::db::ensure_chart_summaries_current;
use t2k_common::{Result, SongId};

use super::{placeholders, ChartDataSource};
use crate::models::{BasicSongRecord, ChartEntry, OneHitRecord};

#[derive(Clone)]
pub struct SummaryChartSource {
    db: SqlitePool,
}

impl SummaryChartSource {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChartDataSource for SummaryChartSource {
    async fn min_max_years(&self) -> Result<Option<(i32, i32)>> {
        ensure_chart_summaries_current(&self.db).await?;

        let (min, max): (Option<i32>, Option<i32>) =
            sqlx::query_as("SELECT MIN(first_year), MAX(last_year) FROM song_chart_summary")
                .fetch_one(&self.db)
                .await?;

        Ok(min.zip(max))
    }

    async fn entries_for_year(
        &self,
        year: i32,
        position_limit: Option<i32>,
    ) -> Result<Vec<ChartEntry>> {
        ensure_chart_summaries_current(&self.db).await?;

        let entries = sqlx::query_as::<_, ChartEntry>(
            r#"
            SELECT song_id, position, year, release_year, title, artist_id, artist_name
            FROM chart_rows
            WHERE year = ?1 AND (?2 IS NULL OR position <= ?2)
            ORDER BY position
            "#,
        )
        .bind(year)
        .bind(position_limit)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    async fn song_ids_charted_before(&self, year: i32) -> Result<Vec<SongId>> {
        ensure_chart_summaries_current(&self.db).await?;

        let ids = sqlx::query_scalar::<_, SongId>(
            "SELECT song_id FROM song_chart_summary WHERE first_year < ?",
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
        ensure_chart_summaries_current(&self.db).await?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT song_id FROM song_chart_summary WHERE first_year < ? AND song_id IN ({})",
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
        ensure_chart_summaries_current(&self.db).await?;

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            r#"
            SELECT r.song_id, r.position
            FROM chart_rows r
            WHERE r.year = (
                SELECT MAX(p.year) FROM chart_rows p
                WHERE p.song_id = r.song_id AND p.year < ?
            )
            AND r.song_id IN ({})
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
        ensure_chart_summaries_current(&self.db).await?;

        let songs = sqlx::query_as::<_, BasicSongRecord>(
            r#"
            SELECT r.song_id, r.title, r.artist_name, r.release_year,
                   NULL AS position, NULL AS position_last_year
            FROM song_chart_summary sm
            JOIN chart_rows r ON r.song_id = sm.song_id AND r.year = sm.first_year
            WHERE sm.years_charted = (SELECT COUNT(DISTINCT year) FROM chart_rows)
            ORDER BY r.title, r.song_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(songs)
    }

    async fn one_hit_wonders(&self) -> Result<Vec<OneHitRecord>> {
        ensure_chart_summaries_current(&self.db).await?;

        let songs = sqlx::query_as::<_, OneHitRecord>(
            r#"
            SELECT r.song_id, r.title, r.artist_name, r.release_year, r.position, r.year
            FROM song_chart_summary sm
            JOIN chart_rows r ON r.song_id = sm.song_id AND r.year = sm.first_year
            WHERE sm.years_charted = 1
            ORDER BY r.title, r.year, r.song_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(songs)
    }

    async fn reentries_for_year(
        &self,
        year: i32,
        top: i32,
    ) -> Result<Option<Vec<BasicSongRecord>>> {
        ensure_chart_summaries_current(&self.db).await?;

        // Charted this year, absent last year, first seen before last year
        let songs = sqlx::query_as::<_, BasicSongRecord>(
            r#"
            SELECT r.song_id, r.title, r.artist_name, r.release_year, r.position,
                   (SELECT p.position FROM chart_rows p
                    WHERE p.song_id = r.song_id AND p.year < ?1
                    ORDER BY p.year DESC LIMIT 1) AS position_last_year
            FROM chart_rows r
            JOIN song_chart_summary sm ON sm.song_id = r.song_id
            WHERE r.year = ?1
              AND r.position <= ?2
              AND sm.first_year < ?1 - 1
              AND NOT EXISTS (
                  SELECT 1 FROM chart_rows q WHERE q.song_id = r.song_id AND q.year = ?1 - 1
              )
            ORDER BY r.title, r.song_id
            "#,
        )
        .bind(year)
        .bind(top)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(songs))
    }
}
