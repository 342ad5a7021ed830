//! Chart data source tests against a seeded SQLite database
//!
//! The relational source, the summary source and the in-memory source must
//! answer every query identically for the same chart.

mod helpers;

use helpers::{create_test_db, sample_chart, seed_chart};
use pretty_assertions::assert_eq;
use t2k_api::source::{
    ChartDataSource, FallbackChartSource, InMemoryChartSource, RelationalChartSource,
    SummaryChartSource,
};
use t2k_api::stats::compute_statistics;
use t2k_common::db::{drop_chart_summaries, refresh_chart_summaries};
use t2k_common::{Error, SongId};

fn sorted(mut ids: Vec<SongId>) -> Vec<SongId> {
    ids.sort_unstable();
    ids
}

async fn assert_sources_agree(a: &dyn ChartDataSource, b: &dyn ChartDataSource) {
    assert_eq!(
        a.min_max_years().await.unwrap(),
        b.min_max_years().await.unwrap()
    );
    assert_eq!(
        a.all_time_classics().await.unwrap(),
        b.all_time_classics().await.unwrap()
    );
    assert_eq!(
        a.one_hit_wonders().await.unwrap(),
        b.one_hit_wonders().await.unwrap()
    );

    let all_ids: Vec<SongId> = (1..=40).collect();
    for year in 2018..=2023 {
        assert_eq!(
            a.entries_for_year(year, Some(10)).await.unwrap(),
            b.entries_for_year(year, Some(10)).await.unwrap()
        );
        assert_eq!(
            a.entries_for_year(year, None).await.unwrap(),
            b.entries_for_year(year, None).await.unwrap()
        );
        assert_eq!(
            sorted(a.song_ids_charted_before(year).await.unwrap()),
            sorted(b.song_ids_charted_before(year).await.unwrap())
        );
        assert_eq!(
            sorted(a.song_ids_charted_before_among(year, &all_ids[..20]).await.unwrap()),
            sorted(b.song_ids_charted_before_among(year, &all_ids[..20]).await.unwrap())
        );
        assert_eq!(
            a.latest_positions_before(year, &all_ids).await.unwrap(),
            b.latest_positions_before(year, &all_ids).await.unwrap()
        );
    }
}

#[tokio::test]
async fn test_relational_source_matches_in_memory() {
    let (_dir, pool) = create_test_db().await;
    let chart = sample_chart();
    seed_chart(&pool, &chart).await;

    let relational = RelationalChartSource::new(pool);
    let memory = InMemoryChartSource::new(chart);

    assert_sources_agree(&relational, &memory).await;
    assert_eq!(relational.reentries_for_year(2023, 10).await.unwrap(), None);
}

#[tokio::test]
async fn test_summary_source_matches_relational() {
    let (_dir, pool) = create_test_db().await;
    seed_chart(&pool, &sample_chart()).await;

    let counts = refresh_chart_summaries(&pool).await.unwrap();
    assert_eq!(counts.songs, 40);

    let relational = RelationalChartSource::new(pool.clone());
    let summary = SummaryChartSource::new(pool);

    assert_sources_agree(&summary, &relational).await;
}

#[tokio::test]
async fn test_summary_reentries_match_in_memory() {
    let (_dir, pool) = create_test_db().await;
    let chart = sample_chart();
    seed_chart(&pool, &chart).await;
    refresh_chart_summaries(&pool).await.unwrap();

    let summary = SummaryChartSource::new(pool);
    let memory = InMemoryChartSource::new(chart).with_precomputed_reentries();

    for year in 2018..=2023 {
        for top in [10, 40] {
            assert_eq!(
                summary.reentries_for_year(year, top).await.unwrap(),
                memory.reentries_for_year(year, top).await.unwrap(),
                "year {} top {}",
                year,
                top
            );
        }
    }
}

#[tokio::test]
async fn test_reports_identical_across_sources() {
    let (_dir, pool) = create_test_db().await;
    let chart = sample_chart();
    seed_chart(&pool, &chart).await;
    refresh_chart_summaries(&pool).await.unwrap();

    let relational = RelationalChartSource::new(pool.clone());
    let summary = SummaryChartSource::new(pool);
    let memory = InMemoryChartSource::new(chart);

    for year in 2018..=2023 {
        let expected = compute_statistics(&memory, year, 10, 3).await.unwrap();
        assert_eq!(compute_statistics(&relational, year, 10, 3).await.unwrap(), expected);
        assert_eq!(compute_statistics(&summary, year, 10, 3).await.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_summary_source_fails_without_tables() {
    let (_dir, pool) = create_test_db().await;
    seed_chart(&pool, &sample_chart()).await;

    let summary = SummaryChartSource::new(pool);

    assert!(summary.min_max_years().await.is_err());
    assert!(summary.entries_for_year(2023, Some(10)).await.is_err());
}

#[tokio::test]
async fn test_fallback_covers_dropped_summaries() {
    let (_dir, pool) = create_test_db().await;
    let chart = sample_chart();
    seed_chart(&pool, &chart).await;
    refresh_chart_summaries(&pool).await.unwrap();
    drop_chart_summaries(&pool).await.unwrap();

    let source = FallbackChartSource::new(
        SummaryChartSource::new(pool.clone()),
        RelationalChartSource::new(pool),
    );
    let memory = InMemoryChartSource::new(chart);

    let expected = compute_statistics(&memory, 2022, 10, 3).await.unwrap();
    let actual = compute_statistics(&source, 2022, 10, 3).await.unwrap();

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_fallback_serves_chart_year_added_after_refresh() {
    let (_dir, pool) = create_test_db().await;
    let chart = sample_chart();
    seed_chart(&pool, &chart).await;

    sqlx::query("DELETE FROM chart_entries WHERE year = 2023")
        .execute(&pool)
        .await
        .unwrap();
    refresh_chart_summaries(&pool).await.unwrap();

    for e in chart.iter().filter(|e| e.year == 2023) {
        sqlx::query("INSERT INTO chart_entries (song_id, year, position) VALUES (?, ?, ?)")
            .bind(e.song_id)
            .bind(e.year)
            .bind(e.position)
            .execute(&pool)
            .await
            .unwrap();
    }

    let summary = SummaryChartSource::new(pool.clone());
    assert!(matches!(summary.min_max_years().await, Err(Error::Stale(_))));
    assert!(matches!(
        summary.entries_for_year(2022, Some(10)).await,
        Err(Error::Stale(_))
    ));

    let relational = RelationalChartSource::new(pool.clone());
    let wired = FallbackChartSource::new(summary, RelationalChartSource::new(pool.clone()));

    assert_eq!(wired.min_max_years().await.unwrap(), Some((2018, 2023)));
    assert_sources_agree(&wired, &relational).await;

    let memory = InMemoryChartSource::new(chart);
    let expected = compute_statistics(&memory, 2023, 10, 3).await.unwrap();
    assert_eq!(compute_statistics(&wired, 2023, 10, 3).await.unwrap(), expected);

    // A refresh brings the summaries back in line
    refresh_chart_summaries(&pool).await.unwrap();
    let summary = SummaryChartSource::new(pool);
    assert_eq!(summary.min_max_years().await.unwrap(), Some((2018, 2023)));
    assert_eq!(compute_statistics(&summary, 2023, 10, 3).await.unwrap(), expected);
}
