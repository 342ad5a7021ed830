//! Artist detail and filtered artist listing

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use t2k_common::{ArtistId, SongId};

use super::{normalize_text, normalize_url};

/// One chart entry joined with its song and artist
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ArtistChartRow {
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub wiki: Option<String>,
    pub biography: Option<String>,
    pub photo: Option<String>,
    pub song_id: SongId,
    pub title: String,
    pub release_year: Option<i32>,
    pub img_url: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSong {
    pub song_id: SongId,
    #[serde(rename = "titel")]
    pub title: String,
    pub release_year: Option<i32>,
    pub highest_rank: Option<i32>,
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongSummary {
    pub song_id: SongId,
    #[serde(rename = "titel")]
    pub title: String,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistChartStats {
    pub total_songs_in_top2000: usize,
    pub highest_rank_overall: Option<i32>,
    pub oldest_song: Option<SongSummary>,
    pub newest_song: Option<SongSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDetail {
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub wikipedia_url: String,
    pub biography: String,
    pub photo: String,
    pub stats: ArtistChartStats,
    pub songs: Vec<ArtistSong>,
}

/// Query string of `/artists`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistQuery {
    pub artist_id: Option<ArtistId>,
    pub artist: Option<String>,
    pub contains: Option<String>,
    pub min_songs: Option<usize>,
    pub max_songs: Option<usize>,
    pub highest_rank: Option<i32>,
    pub has_wiki: Option<bool>,
    pub min_release_year: Option<i32>,
    pub max_release_year: Option<i32>,
    pub year: Option<i32>,
}

/// Which artist rows to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtistSelector {
    ById(ArtistId),
    /// Case-insensitive, already trimmed
    ByName(String),
    Listing {
        year: Option<i32>,
        contains: Option<String>,
    },
}

impl ArtistQuery {
    /// `artistId` wins over `artist`; neither means a listing
    pub fn selector(&self) -> ArtistSelector {
        if let Some(id) = self.artist_id {
            return ArtistSelector::ById(id);
        }
        if let Some(name) = self.artist.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return ArtistSelector::ByName(name.to_string());
        }
        ArtistSelector::Listing {
            year: self.year,
            contains: self
                .contains
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    /// Listing filters applied after grouping
    pub fn matches(&self, artist: &ArtistDetail) -> bool {
        let stats = &artist.stats;
        let songs = stats.total_songs_in_top2000;

        if self.min_songs.map_or(false, |min| songs < min) {
            return false;
        }
        if self.max_songs.map_or(false, |max| songs > max) {
            return false;
        }
        if let Some(limit) = self.highest_rank {
            // Artists without any rank never pass a rank filter
            if !stats.highest_rank_overall.map_or(false, |rank| rank <= limit) {
                return false;
            }
        }
        if let Some(wanted) = self.has_wiki {
            if !artist.wikipedia_url.trim().is_empty() != wanted {
                return false;
            }
        }
        if let Some(min) = self.min_release_year {
            let oldest = stats.oldest_song.as_ref().and_then(|s| s.release_year);
            if !oldest.map_or(false, |y| y >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_release_year {
            let newest = stats.newest_song.as_ref().and_then(|s| s.release_year);
            if !newest.map_or(false, |y| y <= max) {
                return false;
            }
        }
        true
    }
}

/// Ranked values first (ascending), unranked last
fn cmp_rank(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Merge an artist's chart rows into songs keyed by lowercase trimmed title
///
/// The first row of each title supplies id, title, release year and image.
/// Sorted by highest rank (unranked last), then title.
pub fn group_songs(rows: &[&ArtistChartRow]) -> Vec<ArtistSong> {
    let mut keys: Vec<String> = Vec::new();
    let mut songs: Vec<ArtistSong> = Vec::new();

    for row in rows {
        let key = row.title.trim().to_lowercase();
        let rank = Some(row.position).filter(|&p| p > 0);

        match keys.iter().position(|k| *k == key) {
            Some(index) => {
                let song = &mut songs[index];
                if cmp_rank(rank, song.highest_rank) == Ordering::Less {
                    song.highest_rank = rank;
                }
            }
            None => {
                keys.push(key);
                songs.push(ArtistSong {
                    song_id: row.song_id,
                    title: row.title.clone(),
                    release_year: row.release_year,
                    highest_rank: rank,
                    img_url: row.img_url.clone(),
                });
            }
        }
    }

    songs.sort_by(|a, b| cmp_rank(a.highest_rank, b.highest_rank).then_with(|| a.title.cmp(&b.title)));
    songs
}

fn summarize(song: &ArtistSong) -> SongSummary {
    SongSummary {
        song_id: song.song_id,
        title: song.title.clone(),
        release_year: song.release_year,
    }
}

/// Build one artist from rows that all belong to that artist
pub fn build_artist(rows: &[&ArtistChartRow]) -> Option<ArtistDetail> {
    let first = rows.first()?;
    let songs = group_songs(rows);

    let highest_rank_overall = rows.iter().map(|r| r.position).filter(|&p| p > 0).min();

    // First song wins ties on release year
    let dated = songs.iter().filter(|s| s.release_year.is_some());
    let oldest_song = dated
        .clone()
        .fold(None::<&ArtistSong>, |best, s| match best {
            Some(b) if b.release_year <= s.release_year => Some(b),
            _ => Some(s),
        })
        .map(summarize);
    let newest_song = dated
        .fold(None::<&ArtistSong>, |best, s| match best {
            Some(b) if b.release_year >= s.release_year => Some(b),
            _ => Some(s),
        })
        .map(summarize);

    Some(ArtistDetail {
        artist_id: first.artist_id,
        artist_name: first.artist_name.clone(),
        wikipedia_url: first.wiki.clone().unwrap_or_default(),
        biography: first.biography.clone().unwrap_or_default(),
        photo: first.photo.clone().unwrap_or_default(),
        stats: ArtistChartStats {
            total_songs_in_top2000: songs.len(),
            highest_rank_overall,
            oldest_song,
            newest_song,
        },
        songs,
    })
}

/// Group rows per artist (first appearance order) and build each artist
pub fn build_artists(rows: &[ArtistChartRow]) -> Vec<ArtistDetail> {
    let mut groups: Vec<(ArtistId, Vec<&ArtistChartRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(id, _)| *id == row.artist_id) {
            Some((_, members)) => members.push(row),
            None => groups.push((row.artist_id, vec![row])),
        }
    }

    groups
        .iter()
        .filter_map(|(_, members)| build_artist(members))
        .collect()
}

/// Listing order: highest rank overall (unranked last), then most songs
pub fn sort_listing(artists: &mut [ArtistDetail]) {
    artists.sort_by(|a, b| {
        cmp_rank(a.stats.highest_rank_overall, b.stats.highest_rank_overall)
            .then_with(|| b.stats.total_songs_in_top2000.cmp(&a.stats.total_songs_in_top2000))
    });
}

/// Stored artist fields touched by admin updates
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ArtistRecord {
    pub artist_id: ArtistId,
    pub name: String,
    pub wiki: Option<String>,
    pub biography: Option<String>,
    pub photo: Option<String>,
}

/// Body of `PUT /artists/update/:artistId`; absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistPatch {
    pub wiki: Option<String>,
    pub biography: Option<String>,
    pub photo: Option<String>,
}

impl ArtistPatch {
    /// Validate and apply onto `record`; on error `record` is untouched
    pub fn apply(&self, record: &mut ArtistRecord) -> Result<(), String> {
        let wiki = match &self.wiki {
            Some(url) => Some(normalize_url(url).map_err(|e| format!("Invalid Wikipedia URL: {}", e))?),
            None => None,
        };
        let photo = match &self.photo {
            Some(url) => Some(normalize_url(url).map_err(|e| format!("Invalid photo URL: {}", e))?),
            None => None,
        };

        if let Some(wiki) = wiki {
            record.wiki = wiki;
        }
        if let Some(photo) = photo {
            record.photo = photo;
        }
        if let Some(biography) = &self.biography {
            record.biography = Some(normalize_text(biography));
        }
        Ok(())
    }
}

/// Artist as returned after an update (missing values as empty strings)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistView {
    pub artist_id: ArtistId,
    pub name: String,
    pub wiki: String,
    pub biography: String,
    pub photo: String,
}

impl From<ArtistRecord> for ArtistView {
    fn from(record: ArtistRecord) -> Self {
        Self {
            artist_id: record.artist_id,
            name: record.name,
            wiki: record.wiki.unwrap_or_default(),
            biography: record.biography.unwrap_or_default(),
            photo: record.photo.unwrap_or_default(),
        }
    }
}
