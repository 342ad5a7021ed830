//! Movement classification against last year's chart

use super::reconcile::WorkingSet;
use crate::models::{BasicSongRecord, MovementRecord};

/// Outcome of comparing this year's top window with last year's full chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Rose, sorted by difference descending, at most `top`
    pub rises: Vec<MovementRecord>,
    /// Fell, sorted by difference ascending, at most `top`
    pub falls: Vec<MovementRecord>,
    /// All rises then all falls, in chart order, untruncated
    pub movements: Vec<MovementRecord>,
    pub unchanged: Vec<BasicSongRecord>,
    pub same_position: Vec<MovementRecord>,
    /// Not charted last year; re-entries are split off later
    pub new_entries: Vec<BasicSongRecord>,
    /// Charted last year, absent from this year's top window
    pub dropped: Vec<BasicSongRecord>,
}

/// Classify this year's top window against last year's full chart
pub fn classify(working: &WorkingSet) -> Classification {
    let prev_positions = &working.prev_positions;
    let this_ids = &working.this_ids;

    let mut rises = Vec::new();
    let mut falls = Vec::new();
    let mut unchanged = Vec::new();
    let mut same_position = Vec::new();
    let mut new_entries = Vec::new();

    for entry in &working.this_top {
        match prev_positions.get(&entry.song_id) {
            Some(&last) => {
                let movement = entry.to_movement(last);
                if movement.difference > 0 {
                    rises.push(movement);
                } else if movement.difference < 0 {
                    falls.push(movement);
                } else {
                    unchanged.push(entry.to_basic());
                    same_position.push(movement);
                }
            }
            None => new_entries.push(entry.to_basic()),
        }
    }

    let mut dropped: Vec<BasicSongRecord> = working
        .prev_all
        .iter()
        .filter(|e| !this_ids.contains(&e.song_id))
        .map(|e| BasicSongRecord {
            position: None,
            position_last_year: Some(e.position),
            ..e.to_basic()
        })
        .collect();

    let movements: Vec<MovementRecord> = rises.iter().chain(falls.iter()).cloned().collect();

    let limit = usize::try_from(working.top).unwrap_or(0);

    // sort_by is stable, so equal differences keep chart order
    rises.sort_by(|a, b| b.difference.cmp(&a.difference));
    rises.truncate(limit);
    falls.sort_by(|a, b| a.difference.cmp(&b.difference));
    falls.truncate(limit);

    sort_by_title(&mut unchanged);
    sort_by_title(&mut new_entries);
    sort_by_title(&mut dropped);

    Classification {
        rises,
        falls,
        movements,
        unchanged,
        same_position,
        new_entries,
        dropped,
    }
}

/// Stable ascending sort on title
pub fn sort_by_title(songs: &mut [BasicSongRecord]) {
    songs.sort_by(|a, b| a.title.cmp(&b.title));
}
