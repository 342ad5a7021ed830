//! Re-entry resolution
//!
//! Splits the classifier's new entries into debuts and re-entries. A
//! re-entry is a song missing from last year's chart that charted in some
//! earlier year; it carries its most recent earlier position.

use std::collections::{BTreeSet, HashMap, HashSet};
use t2k_common::SongId;
use tracing::debug;

use super::movement::sort_by_title;
use super::StatsError;
use crate::models::BasicSongRecord;
use crate::source::ChartDataSource;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReentrySplit {
    pub reentries: Vec<BasicSongRecord>,
    pub pure_new: Vec<BasicSongRecord>,
}

/// Split using a precomputed re-entry list
///
/// Only songs that are new entries are taken over from `precomputed`, so both
/// halves always partition `new_entries`.
pub fn split_precomputed(
    new_entries: &[BasicSongRecord],
    precomputed: &[BasicSongRecord],
) -> ReentrySplit {
    let previous: HashMap<SongId, Option<i32>> = precomputed
        .iter()
        .map(|r| (r.song_id, r.position_last_year))
        .collect();

    split(new_entries, |song_id| previous.get(&song_id).copied())
}

/// Split using each song's most recent earlier position
pub fn split_with_history(
    new_entries: &[BasicSongRecord],
    latest_positions: &HashMap<SongId, i32>,
) -> ReentrySplit {
    split(new_entries, |song_id| {
        latest_positions.get(&song_id).map(|&p| Some(p))
    })
}

/// `lookup` returns `Some(position_last_year)` for re-entries
fn split(
    new_entries: &[BasicSongRecord],
    lookup: impl Fn(SongId) -> Option<Option<i32>>,
) -> ReentrySplit {
    let mut result = ReentrySplit::default();

    for song in new_entries {
        match lookup(song.song_id) {
            Some(position_last_year) => result.reentries.push(BasicSongRecord {
                position_last_year,
                ..song.clone()
            }),
            None => result.pure_new.push(song.clone()),
        }
    }

    sort_by_title(&mut result.reentries);
    sort_by_title(&mut result.pure_new);
    result
}

/// New entries already known to have charted before last year
pub fn candidate_ids(
    new_entries: &[BasicSongRecord],
    earlier_song_ids: &HashSet<SongId>,
) -> BTreeSet<SongId> {
    new_entries
        .iter()
        .map(|s| s.song_id)
        .filter(|id| earlier_song_ids.contains(id))
        .collect()
}

/// Resolve re-entries for `year`
///
/// Uses `precomputed` when present. Otherwise the candidates from
/// `earlier_song_ids` are double-checked with a direct lookup and their
/// latest earlier positions are fetched; candidates without any earlier
/// position stay pure new entries.
pub async fn resolve(
    source: &dyn ChartDataSource,
    year: i32,
    new_entries: &[BasicSongRecord],
    earlier_song_ids: &HashSet<SongId>,
    precomputed: Option<&[BasicSongRecord]>,
) -> Result<ReentrySplit, StatsError> {
    if let Some(precomputed) = precomputed {
        debug!("Using {} precomputed re-entries", precomputed.len());
        return Ok(split_precomputed(new_entries, precomputed));
    }

    if new_entries.is_empty() {
        return Ok(ReentrySplit::default());
    }

    let new_ids: Vec<SongId> = new_entries.iter().map(|s| s.song_id).collect();
    let mut candidates = candidate_ids(new_entries, earlier_song_ids);
    candidates.extend(source.song_ids_charted_before_among(year - 1, &new_ids).await?);

    if candidates.is_empty() {
        return Ok(split_with_history(new_entries, &HashMap::new()));
    }

    let candidates: Vec<SongId> = candidates.into_iter().collect();
    let latest = source.latest_positions_before(year, &candidates).await?;

    Ok(split_with_history(new_entries, &latest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChartEntry;
    use crate::source::InMemoryChartSource;

    fn song(song_id: SongId, title: &str, position: i32) -> BasicSongRecord {
        BasicSongRecord {
            song_id,
            title: title.to_string(),
            artist_name: "Artist".to_string(),
            release_year: None,
            position: Some(position),
            position_last_year: None,
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

    #[test]
    fn test_split_with_history() {
        let new_entries = vec![song(1, "B", 4), song(2, "A", 9)];
        let latest = HashMap::from([(1, 12)]);

        let result = split_with_history(&new_entries, &latest);

        assert_eq!(result.reentries.len(), 1);
        assert_eq!(result.reentries[0].song_id, 1);
        assert_eq!(result.reentries[0].position, Some(4));
        assert_eq!(result.reentries[0].position_last_year, Some(12));
        assert_eq!(result.pure_new.len(), 1);
        assert_eq!(result.pure_new[0].song_id, 2);
    }

    #[test]
    fn test_precomputed_limited_to_new_entries() {
        let new_entries = vec![song(1, "A", 4), song(2, "B", 9)];
        let precomputed = vec![
            BasicSongRecord {
                position_last_year: Some(33),
                ..song(2, "B", 9)
            },
            // Not a new entry this year; must not leak into the report
            BasicSongRecord {
                position_last_year: Some(5),
                ..song(7, "C", 3)
            },
        ];

        let result = split_precomputed(&new_entries, &precomputed);

        assert_eq!(result.reentries.len(), 1);
        assert_eq!(result.reentries[0].song_id, 2);
        assert_eq!(result.reentries[0].position_last_year, Some(33));
        assert_eq!(result.pure_new.len(), 1);
        assert_eq!(result.pure_new[0].song_id, 1);
    }

    #[test]
    fn test_candidate_ids() {
        let new_entries = vec![song(1, "A", 1), song(2, "B", 2), song(3, "C", 3)];
        let earlier = HashSet::from([2, 3, 99]);

        let candidates: Vec<SongId> = candidate_ids(&new_entries, &earlier).into_iter().collect();
        assert_eq!(candidates, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_resolve_finds_latest_earlier_position() {
        // Song 1 charted in 2010 and 2015, skipped 2016-2019, back in 2020
        let source = InMemoryChartSource::new(vec![
            entry(1, 2010, 80),
            entry(1, 2015, 60),
            entry(1, 2020, 50),
            entry(2, 2020, 51),
            entry(3, 2019, 1),
        ]);
        let new_entries = vec![song(1, "Song 1", 50), song(2, "Song 2", 51)];

        // Earlier ids deliberately incomplete: the direct lookup still finds song 1
        let result = resolve(&source, 2020, &new_entries, &HashSet::new(), None)
            .await
            .unwrap();

        assert_eq!(result.reentries.len(), 1);
        assert_eq!(result.reentries[0].song_id, 1);
        assert_eq!(result.reentries[0].position_last_year, Some(60));
        assert_eq!(result.pure_new.len(), 1);
        assert_eq!(result.pure_new[0].song_id, 2);
    }

    #[tokio::test]
    async fn test_resolve_prefers_precomputed() {
        let source = InMemoryChartSource::default();
        let new_entries = vec![song(1, "A", 1)];
        let precomputed = vec![BasicSongRecord {
            position_last_year: Some(8),
            ..song(1, "A", 1)
        }];

        let result = resolve(&source, 2020, &new_entries, &HashSet::new(), Some(&precomputed))
            .await
            .unwrap();

        assert_eq!(result.reentries.len(), 1);
        assert!(result.pure_new.is_empty());
    }
}
