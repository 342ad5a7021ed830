//! Test helper utilities
//!
//! Shared chart fixtures for t2k-api integration tests:
//! - builders for in-memory chart entries
//! - a generated multi-year chart
//! - temporary SQLite databases seeded from the same entries

#![allow(dead_code)]

pub mod db_utils;

pub use db_utils::{create_test_db, seed_chart};

use t2k_api::models::ChartEntry;
use t2k_common::{ArtistId, SongId};

/// Chart entry with a generated title and artist name
pub fn entry(song_id: SongId, year: i32, position: i32, artist_id: ArtistId) -> ChartEntry {
    ChartEntry {
        song_id,
        position,
        year,
        release_year: Some(1960 + (song_id % 50) as i32),
        title: format!("Song {:02}", song_id),
        artist_id,
        artist_name: format!("Artist {}", artist_id),
    }
}

/// Six chart years (2018-2023) over forty songs and six artists
///
/// Roughly four in five songs chart each year, so the data contains rises,
/// falls, drop-outs and songs that return after a gap.
pub fn sample_chart() -> Vec<ChartEntry> {
    let mut entries = Vec::new();

    for year in 2018..=2023 {
        let mut charted: Vec<SongId> = (1..=40)
            .filter(|song| (song * 7 + i64::from(year)) % 5 != 0)
            .collect();
        charted.sort_by_key(|song| ((song * 31 + i64::from(year) * 17) % 97, *song));

        for (index, song_id) in charted.into_iter().enumerate() {
            entries.push(entry(song_id, year, index as i32 + 1, song_id % 6 + 1));
        }
    }

    entries
}
