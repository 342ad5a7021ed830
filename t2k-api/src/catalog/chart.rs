//! Ranked chart listing for one year

use serde::{Deserialize, Serialize};
use t2k_common::{ArtistId, SongId};

/// One row of `/top2000/:year`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    pub song_id: SongId,
    pub year: i32,
    pub position: i32,
    pub position_last_year: Option<i32>,
    /// `position_last_year - position`
    pub difference: Option<i32>,
    #[serde(rename = "titel")]
    pub title: String,
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub release_year: Option<i32>,
    pub img_url: Option<String>,
}

/// Query string of `/top2000/:year`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartQuery {
    pub artist_id: Option<ArtistId>,
    pub song_id: Option<SongId>,
    pub sort: Option<String>,
    /// `0` or absent returns every row
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSort {
    Position,
    Artist,
    Title,
    /// Newest release first, unknown release year last
    Release,
}

impl ChartSort {
    /// Unknown values sort by position
    pub fn from_param(sort: Option<&str>) -> Self {
        match sort.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("artist") => ChartSort::Artist,
            Some("title") => ChartSort::Title,
            Some("release") => ChartSort::Release,
            _ => ChartSort::Position,
        }
    }
}

/// Order rows; equal keys stay in chart order
pub fn sort_rows(rows: &mut [ChartRow], sort: ChartSort) {
    rows.sort_by_key(|r| r.position);

    match sort {
        ChartSort::Position => {}
        ChartSort::Artist => rows.sort_by_cached_key(|r| r.artist_name.to_lowercase()),
        ChartSort::Title => rows.sort_by_cached_key(|r| r.title.to_lowercase()),
        ChartSort::Release => rows.sort_by(|a, b| match (a.release_year, b.release_year) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
    }
}

/// Sort then truncate to `limit` (when non-zero)
pub fn shape_listing(mut rows: Vec<ChartRow>, query: &ChartQuery) -> Vec<ChartRow> {
    sort_rows(&mut rows, ChartSort::from_param(query.sort.as_deref()));

    if let Some(limit) = query.limit.filter(|&l| l > 0) {
        rows.truncate(limit);
    }
    rows
}

/// Message for an empty listing, naming the filter that emptied it
pub fn empty_listing_message(year: i32, query: &ChartQuery) -> String {
    if let Some(song_id) = query.song_id {
        format!("No chart data for year {} with songId {}", year, song_id)
    } else if let Some(artist_id) = query.artist_id {
        format!("No chart data for year {} with artistId {}", year, artist_id)
    } else {
        format!("No chart data for year {}", year)
    }
}
