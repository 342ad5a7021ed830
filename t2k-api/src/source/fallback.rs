//! Optimized-then-relational data source
//!
//! Every call goes to the primary source first. Any error from the primary is
//! logged at `warn` and the same call is made once against the fallback; only
//! a fallback error reaches the caller.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use t2k_common::{Result, SongId};
use tracing::warn;

use super::ChartDataSource;
use crate::models::{BasicSongRecord, ChartEntry, OneHitRecord};

pub struct FallbackChartSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackChartSource<P, F>
where
    P: ChartDataSource,
    F: ChartDataSource,
{
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

/// Await `primary`; on error log it and await `fallback` instead
async fn substitute<T, A, B>(operation: &str, primary: A, fallback: impl FnOnce() -> B) -> Result<T>
where
    A: Future<Output = Result<T>>,
    B: Future<Output = Result<T>>,
{
    match primary.await {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("Optimized {} failed, using relational query: {}", operation, e);
            fallback().await
        }
    }
}

#[async_trait]
impl<P, F> ChartDataSource for FallbackChartSource<P, F>
where
    P: ChartDataSource,
    F: ChartDataSource,
{
    async fn min_max_years(&self) -> Result<Option<(i32, i32)>> {
        substitute("min/max years", self.primary.min_max_years(), || {
            self.fallback.min_max_years()
        })
        .await
    }

    async fn entries_for_year(
        &self,
        year: i32,
        position_limit: Option<i32>,
    ) -> Result<Vec<ChartEntry>> {
        substitute(
            "chart entries",
            self.primary.entries_for_year(year, position_limit),
            || self.fallback.entries_for_year(year, position_limit),
        )
        .await
    }

    async fn song_ids_charted_before(&self, year: i32) -> Result<Vec<SongId>> {
        substitute(
            "earlier song ids",
            self.primary.song_ids_charted_before(year),
            || self.fallback.song_ids_charted_before(year),
        )
        .await
    }

    async fn song_ids_charted_before_among(
        &self,
        year: i32,
        ids: &[SongId],
    ) -> Result<Vec<SongId>> {
        substitute(
            "earlier song lookup",
            self.primary.song_ids_charted_before_among(year, ids),
            || self.fallback.song_ids_charted_before_among(year, ids),
        )
        .await
    }

    async fn latest_positions_before(
        &self,
        year: i32,
        ids: &[SongId],
    ) -> Result<HashMap<SongId, i32>> {
        substitute(
            "latest positions",
            self.primary.latest_positions_before(year, ids),
            || self.fallback.latest_positions_before(year, ids),
        )
        .await
    }

    async fn all_time_classics(&self) -> Result<Vec<BasicSongRecord>> {
        substitute("all-time classics", self.primary.all_time_classics(), || {
            self.fallback.all_time_classics()
        })
        .await
    }

    async fn one_hit_wonders(&self) -> Result<Vec<OneHitRecord>> {
        substitute("one-hit wonders", self.primary.one_hit_wonders(), || {
            self.fallback.one_hit_wonders()
        })
        .await
    }

    async fn reentries_for_year(
        &self,
        year: i32,
        top: i32,
    ) -> Result<Option<Vec<BasicSongRecord>>> {
        substitute(
            "re-entries",
            self.primary.reentries_for_year(year, top),
            || self.fallback.reentries_for_year(year, top),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryChartSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use t2k_common::Error;

    /// Fails every call and counts how often it was asked
    #[derive(Default)]
    struct BrokenSource {
        calls: AtomicUsize,
    }

    impl BrokenSource {
        fn fail<T>(&self) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Internal("summary tables missing".to_string()))
        }
    }

    #[async_trait]
    impl ChartDataSource for BrokenSource {
        async fn min_max_years(&self) -> Result<Option<(i32, i32)>> {
            self.fail()
        }
        async fn entries_for_year(&self, _: i32, _: Option<i32>) -> Result<Vec<ChartEntry>> {
            self.fail()
        }
        async fn song_ids_charted_before(&self, _: i32) -> Result<Vec<SongId>> {
            self.fail()
        }
        async fn song_ids_charted_before_among(&self, _: i32, _: &[SongId]) -> Result<Vec<SongId>> {
            self.fail()
        }
        async fn latest_positions_before(
            &self,
            _: i32,
            _: &[SongId],
        ) -> Result<HashMap<SongId, i32>> {
            self.fail()
        }
        async fn all_time_classics(&self) -> Result<Vec<BasicSongRecord>> {
            self.fail()
        }
        async fn one_hit_wonders(&self) -> Result<Vec<OneHitRecord>> {
            self.fail()
        }
        async fn reentries_for_year(&self, _: i32, _: i32) -> Result<Option<Vec<BasicSongRecord>>> {
            self.fail()
        }
    }

    fn entry(song_id: SongId, year: i32, position: i32) -> ChartEntry {
        ChartEntry {
            song_id,
            position,
            year,
            release_year: None,
            title: format!("Song {}", song_id),
            artist_id: 1,
            artist_name: "Artist".to_string(),
        }
    }

    #[tokio::test]
    async fn test_primary_error_is_substituted_once() {
        let memory = InMemoryChartSource::new(vec![entry(1, 2020, 1), entry(1, 2021, 2)]);
        let source = FallbackChartSource::new(BrokenSource::default(), memory);

        assert_eq!(source.min_max_years().await.unwrap(), Some((2020, 2021)));
        assert_eq!(source.entries_for_year(2021, None).await.unwrap().len(), 1);
        assert_eq!(source.primary.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = InMemoryChartSource::new(vec![entry(1, 2020, 1)]);
        let fallback = BrokenSource::default();
        let source = FallbackChartSource::new(primary, fallback);

        assert_eq!(source.min_max_years().await.unwrap(), Some((2020, 2020)));
        assert_eq!(source.fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_error_propagates() {
        let source = FallbackChartSource::new(BrokenSource::default(), BrokenSource::default());

        assert!(source.one_hit_wonders().await.is_err());
        assert_eq!(source.primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.fallback.calls.load(Ordering::SeqCst), 1);
    }
}
