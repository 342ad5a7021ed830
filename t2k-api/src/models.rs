//! Chart and statistics records
//!
//! All records are request-scoped snapshots. JSON field names are camelCase
//! and the song title is serialized as `titel`, matching the existing
//! front-end.

use serde::{Deserialize, Serialize};
use t2k_common::{ArtistId, SongId};

/// One chart row: a song at a position in a given year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    pub song_id: SongId,
    pub position: i32,
    pub year: i32,
    pub release_year: Option<i32>,
    #[serde(rename = "titel")]
    pub title: String,
    pub artist_id: ArtistId,
    pub artist_name: String,
}

impl ChartEntry {
    /// Lightweight reference carrying this year's position
    pub fn to_basic(&self) -> BasicSongRecord {
        BasicSongRecord {
            song_id: self.song_id,
            title: self.title.clone(),
            artist_name: self.artist_name.clone(),
            release_year: self.release_year,
            position: Some(self.position),
            position_last_year: None,
        }
    }

    /// Movement against a previous position (`difference > 0` means it rose)
    pub fn to_movement(&self, position_last_year: i32) -> MovementRecord {
        MovementRecord {
            song_id: self.song_id,
            title: self.title.clone(),
            artist_name: self.artist_name.clone(),
            position: self.position,
            release_year: self.release_year,
            position_last_year,
            difference: position_last_year - self.position,
        }
    }
}

/// Generic song reference used by most report lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BasicSongRecord {
    pub song_id: SongId,
    #[serde(rename = "titel")]
    pub title: String,
    pub artist_name: String,
    pub release_year: Option<i32>,
    pub position: Option<i32>,
    pub position_last_year: Option<i32>,
}

/// Year-over-year movement of a song present in both years
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecord {
    pub song_id: SongId,
    #[serde(rename = "titel")]
    pub title: String,
    pub artist_name: String,
    pub position: i32,
    pub release_year: Option<i32>,
    pub position_last_year: i32,
    /// `position_last_year - position`
    pub difference: i32,
}

/// A song that charted in exactly one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OneHitRecord {
    pub song_id: SongId,
    #[serde(rename = "titel")]
    pub title: String,
    pub artist_name: String,
    pub release_year: Option<i32>,
    pub position: i32,
    pub year: i32,
}

impl OneHitRecord {
    pub fn to_basic(&self) -> BasicSongRecord {
        BasicSongRecord {
            song_id: self.song_id,
            title: self.title.clone(),
            artist_name: self.artist_name.clone(),
            release_year: self.release_year,
            position: Some(self.position),
            position_last_year: None,
        }
    }
}

/// Aggregate over one year's entries for an artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistStat {
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub count: usize,
    pub avg_position: f64,
    pub best_position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistCount {
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub count: usize,
}

impl From<&ArtistStat> for ArtistCount {
    fn from(stat: &ArtistStat) -> Self {
        Self {
            artist_id: stat.artist_id,
            artist_name: stat.artist_name.clone(),
            count: stat.count,
        }
    }
}

/// Consecutive chart positions held by one artist (length >= 2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentSequence {
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub positions: Vec<i32>,
    pub songs: Vec<BasicSongRecord>,
}

/// Payload of a UI card; serialized as the bare list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardPayload {
    Movements(Vec<MovementRecord>),
    Songs(Vec<BasicSongRecord>),
    OneHits(Vec<OneHitRecord>),
    ArtistStats(Vec<ArtistStat>),
    ArtistCounts(Vec<ArtistCount>),
}

impl CardPayload {
    pub fn len(&self) -> usize {
        match self {
            Self::Movements(v) => v.len(),
            Self::Songs(v) => v.len(),
            Self::OneHits(v) => v.len(),
            Self::ArtistStats(v) => v.len(),
            Self::ArtistCounts(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Titled grouping of one report list for direct UI use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub title: String,
    pub subtitle: Option<String>,
    pub payload: CardPayload,
}

/// Year-over-year statistics for one chart year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub year: i32,
    pub biggest_rises: Vec<MovementRecord>,
    pub biggest_falls: Vec<MovementRecord>,
    pub new_entries: Vec<BasicSongRecord>,
    pub dropped_entries: Vec<BasicSongRecord>,
    pub reentries: Vec<BasicSongRecord>,
    pub unchanged: Vec<BasicSongRecord>,
    pub adjacent_artist_runs: Vec<BasicSongRecord>,
    pub all_time_classics: Vec<BasicSongRecord>,
    pub one_hit_wonders: Vec<OneHitRecord>,
    pub top_artists: Vec<ArtistStat>,
    pub artist_counts: Vec<ArtistCount>,

    pub movements: Vec<MovementRecord>,
    pub same_position: Vec<MovementRecord>,
    pub adjacent_sequences: Vec<AdjacentSequence>,
    pub single_appearances: Vec<BasicSongRecord>,
    pub artist_stats: Vec<ArtistStat>,

    pub cards: Vec<Card>,
}
