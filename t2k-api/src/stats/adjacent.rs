//! Adjacent-position runs held by one artist

use std::collections::{HashMap, HashSet};
use t2k_common::{ArtistId, SongId};

use crate::models::{AdjacentSequence, BasicSongRecord, ChartEntry};

/// `(artist_id, artist_name)` with that artist's entries
pub(crate) type ArtistGroup<'a> = ((ArtistId, &'a str), Vec<&'a ChartEntry>);

/// Group entries by `(artist_id, artist_name)` in order of first appearance
pub(crate) fn group_by_artist(entries: &[ChartEntry]) -> Vec<ArtistGroup<'_>> {
    let mut groups: Vec<ArtistGroup<'_>> = Vec::new();
    let mut index: HashMap<(ArtistId, &str), usize> = HashMap::new();

    for entry in entries {
        let key = (entry.artist_id, entry.artist_name.as_str());
        match index.get(&key) {
            Some(&i) => groups[i].1.push(entry),
            None => {
                index.insert(key, groups.len());
                groups.push((key, vec![entry]));
            }
        }
    }

    groups
}

/// Maximal runs of >= 2 consecutive positions per artist
///
/// `entries` should be ordered by position so artists are visited by their
/// best position.
pub fn detect_runs(entries: &[ChartEntry]) -> Vec<AdjacentSequence> {
    let mut sequences = Vec::new();

    for ((artist_id, artist_name), mut members) in group_by_artist(entries) {
        members.sort_by(|a, b| a.position.cmp(&b.position).then(a.song_id.cmp(&b.song_id)));

        let mut run: Vec<&ChartEntry> = Vec::new();
        for entry in members {
            let extends = run
                .last()
                .map_or(false, |last| entry.position == last.position + 1);

            if !extends {
                flush_run(&run, artist_id, artist_name, &mut sequences);
                run.clear();
            }
            run.push(entry);
        }
        flush_run(&run, artist_id, artist_name, &mut sequences);
    }

    sequences
}

fn flush_run(
    run: &[&ChartEntry],
    artist_id: ArtistId,
    artist_name: &str,
    sequences: &mut Vec<AdjacentSequence>,
) {
    if run.len() < 2 {
        return;
    }

    sequences.push(AdjacentSequence {
        artist_id,
        artist_name: artist_name.to_string(),
        positions: run.iter().map(|e| e.position).collect(),
        songs: run.iter().map(|e| e.to_basic()).collect(),
    });
}

/// All songs in all runs, first occurrence of each song wins
pub fn flatten_runs(sequences: &[AdjacentSequence]) -> Vec<BasicSongRecord> {
    let mut seen: HashSet<SongId> = HashSet::new();
    sequences
        .iter()
        .flat_map(|s| s.songs.iter())
        .filter(|song| seen.insert(song.song_id))
        .cloned()
        .collect()
}
