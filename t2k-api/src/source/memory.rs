//! In-memory chart data
//!
//! Holds a fixed list of chart entries and answers every query by scanning
//! it. Used to drive the statistics pipeline without a database, and as a
//! reference for what the SQL sources must return.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use t2k_common::{Result, SongId};

use super::ChartDataSource;
use crate::models::{BasicSongRecord, ChartEntry, OneHitRecord};

#[derive(Debug, Clone, Default)]
pub struct InMemoryChartSource {
    entries: Vec<ChartEntry>,
    precomputed_reentries: bool,
}

impl InMemoryChartSource {
    pub fn new(entries: Vec<ChartEntry>) -> Self {
        Self {
            entries,
            precomputed_reentries: false,
        }
    }

    /// Answer `reentries_for_year` directly instead of returning `None`
    pub fn with_precomputed_reentries(mut self) -> Self {
        self.precomputed_reentries = true;
        self
    }

    fn years_by_song(&self) -> HashMap<SongId, Vec<&ChartEntry>> {
        let mut by_song: HashMap<SongId, Vec<&ChartEntry>> = HashMap::new();
        for entry in &self.entries {
            by_song.entry(entry.song_id).or_default().push(entry);
        }
        by_song
    }

    fn latest_before(&self, year: i32, song_id: SongId) -> Option<i32> {
        self.entries
            .iter()
            .filter(|e| e.song_id == song_id && e.year < year)
            .max_by_key(|e| e.year)
            .map(|e| e.position)
    }
}

#[async_trait]
impl ChartDataSource for InMemoryChartSource {
    async fn min_max_years(&self) -> Result<Option<(i32, i32)>> {
        let min = self.entries.iter().map(|e| e.year).min();
        let max = self.entries.iter().map(|e| e.year).max();
        Ok(min.zip(max))
    }

    async fn entries_for_year(
        &self,
        year: i32,
        position_limit: Option<i32>,
    ) -> Result<Vec<ChartEntry>> {
        let mut entries: Vec<ChartEntry> = self
            .entries
            .iter()
            .filter(|e| e.year == year && position_limit.map_or(true, |limit| e.position <= limit))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.position);
        Ok(entries)
    }

    async fn song_ids_charted_before(&self, year: i32) -> Result<Vec<SongId>> {
        let ids: BTreeSet<SongId> = self
            .entries
            .iter()
            .filter(|e| e.year < year)
            .map(|e| e.song_id)
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn song_ids_charted_before_among(
        &self,
        year: i32,
        ids: &[SongId],
    ) -> Result<Vec<SongId>> {
        let wanted: HashSet<SongId> = ids.iter().copied().collect();
        let found: BTreeSet<SongId> = self
            .entries
            .iter()
            .filter(|e| e.year < year && wanted.contains(&e.song_id))
            .map(|e| e.song_id)
            .collect();
        Ok(found.into_iter().collect())
    }

    async fn latest_positions_before(
        &self,
        year: i32,
        ids: &[SongId],
    ) -> Result<HashMap<SongId, i32>> {
        Ok(ids
            .iter()
            .filter_map(|&id| self.latest_before(year, id).map(|position| (id, position)))
            .collect())
    }

    async fn all_time_classics(&self) -> Result<Vec<BasicSongRecord>> {
        let all_years: BTreeSet<i32> = self.entries.iter().map(|e| e.year).collect();

        let mut classics: Vec<BasicSongRecord> = self
            .years_by_song()
            .into_values()
            .filter(|rows| {
                let years: BTreeSet<i32> = rows.iter().map(|e| e.year).collect();
                years == all_years
            })
            .filter_map(|rows| rows.first().map(|e| BasicSongRecord {
                position: None,
                ..e.to_basic()
            }))
            .collect();

        classics.sort_by(|a, b| a.title.cmp(&b.title).then(a.song_id.cmp(&b.song_id)));
        Ok(classics)
    }

    async fn one_hit_wonders(&self) -> Result<Vec<OneHitRecord>> {
        let mut one_hits: Vec<OneHitRecord> = self
            .years_by_song()
            .into_values()
            .filter(|rows| rows.len() == 1)
            .map(|rows| {
                let e = rows[0];
                OneHitRecord {
                    song_id: e.song_id,
                    title: e.title.clone(),
                    artist_name: e.artist_name.clone(),
                    release_year: e.release_year,
                    position: e.position,
                    year: e.year,
                }
            })
            .collect();

        one_hits.sort_by(|a, b| {
            a.title
                .cmp(&b.title)
                .then(a.year.cmp(&b.year))
                .then(a.song_id.cmp(&b.song_id))
        });
        Ok(one_hits)
    }

    async fn reentries_for_year(
        &self,
        year: i32,
        top: i32,
    ) -> Result<Option<Vec<BasicSongRecord>>> {
        if !self.precomputed_reentries {
            return Ok(None);
        }

        let last_year: HashSet<SongId> = self
            .entries
            .iter()
            .filter(|e| e.year == year - 1)
            .map(|e| e.song_id)
            .collect();

        let mut reentries: Vec<BasicSongRecord> = self
            .entries
            .iter()
            .filter(|e| e.year == year && e.position <= top && !last_year.contains(&e.song_id))
            .filter_map(|e| {
                self.latest_before(year, e.song_id).map(|previous| BasicSongRecord {
                    position_last_year: Some(previous),
                    ..e.to_basic()
                })
            })
            .collect();

        reentries.sort_by(|a, b| a.title.cmp(&b.title).then(a.song_id.cmp(&b.song_id)));
        Ok(Some(reentries))
    }
}
