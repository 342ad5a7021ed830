//! Per-artist aggregation over this year's top window

use super::adjacent::group_by_artist;
use crate::models::{ArtistCount, ArtistStat, ChartEntry};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistAggregate {
    /// Every artist, most entries first
    pub artist_stats: Vec<ArtistStat>,
    /// Leading artists, complete on ties
    pub top_artists: Vec<ArtistStat>,
    pub artist_counts: Vec<ArtistCount>,
}

/// Count, mean position and best position per artist
///
/// Artists with equal counts keep their order of first appearance.
pub fn artist_stats(entries: &[ChartEntry]) -> Vec<ArtistStat> {
    let mut stats: Vec<ArtistStat> = group_by_artist(entries)
        .into_iter()
        .map(|((artist_id, artist_name), members)| {
            let total: i64 = members.iter().map(|e| i64::from(e.position)).sum();
            ArtistStat {
                artist_id,
                artist_name: artist_name.to_string(),
                count: members.len(),
                avg_position: total as f64 / members.len() as f64,
                best_position: members.iter().map(|e| e.position).min().unwrap_or_default(),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

/// Take whole count tiers until at least `wanted` artists are included
///
/// `stats` must be sorted by count descending.
pub fn select_top_artists(stats: &[ArtistStat], wanted: usize) -> Vec<ArtistStat> {
    let mut selected: Vec<ArtistStat> = Vec::new();

    for stat in stats {
        let same_tier = selected.last().map_or(false, |last| last.count == stat.count);
        if selected.len() >= wanted && !same_tier {
            break;
        }
        selected.push(stat.clone());
    }

    selected
}

pub fn aggregate(entries: &[ChartEntry], top_artists: usize) -> ArtistAggregate {
    let artist_stats = artist_stats(entries);
    let top_artists = select_top_artists(&artist_stats, top_artists);
    let artist_counts = artist_stats.iter().map(ArtistCount::from).collect();

    ArtistAggregate {
        artist_stats,
        top_artists,
        artist_counts,
    }
}
