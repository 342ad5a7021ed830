//! Year reconciliation: validate the request and load the working set

use std::collections::{HashMap, HashSet};
use t2k_common::SongId;
use tracing::debug;

use super::StatsError;
use crate::models::{BasicSongRecord, ChartEntry, OneHitRecord};
use crate::source::ChartDataSource;

/// Everything the later stages read, fetched once per request
#[derive(Debug, Clone)]
pub struct WorkingSet {
    pub year: i32,
    pub top: i32,
    /// This year's entries with `position <= top`, ordered by position
    pub this_top: Vec<ChartEntry>,
    /// All of last year's entries, ordered by position
    pub prev_all: Vec<ChartEntry>,
    /// Last year's position per song
    pub prev_positions: HashMap<SongId, i32>,
    /// Songs in this year's top window
    pub this_ids: HashSet<SongId>,
    /// Songs charted in any year before last year
    pub earlier_song_ids: HashSet<SongId>,
    pub classics: Vec<BasicSongRecord>,
    pub one_hits: Vec<OneHitRecord>,
    /// `None` when the source left re-entries to the pipeline
    pub precomputed_reentries: Option<Vec<BasicSongRecord>>,
}

impl WorkingSet {
    /// Working set over two charts and their lookup maps, with no history
    ///
    /// Both charts are put in position order and `this_top` is cut to `top`.
    pub fn from_charts(
        year: i32,
        top: i32,
        this_top: Vec<ChartEntry>,
        mut prev_all: Vec<ChartEntry>,
    ) -> Self {
        let this_top = limit_to_top(this_top, top);
        sort_by_position(&mut prev_all);

        let prev_positions = prev_all.iter().map(|e| (e.song_id, e.position)).collect();
        let this_ids = this_top.iter().map(|e| e.song_id).collect();

        Self {
            year,
            top,
            this_top,
            prev_all,
            prev_positions,
            this_ids,
            earlier_song_ids: HashSet::new(),
            classics: Vec::new(),
            one_hits: Vec::new(),
            precomputed_reentries: None,
        }
    }
}

/// `top >= 1`, `top_artists >= 0`
pub fn validate_params(top: i32, top_artists: i32) -> Result<(), StatsError> {
    if top < 1 {
        return Err(StatsError::InvalidParameter(format!(
            "top must be at least 1 (got {})",
            top
        )));
    }
    if top_artists < 0 {
        return Err(StatsError::InvalidParameter(format!(
            "topArtists must not be negative (got {})",
            top_artists
        )));
    }
    Ok(())
}

/// Accept `year` only inside the known chart range
pub fn check_year(range: Option<(i32, i32)>, year: i32) -> Result<(), StatsError> {
    let (min_year, max_year) = range.ok_or(StatsError::NoDataAvailable)?;
    if year < min_year || year > max_year {
        return Err(StatsError::YearOutOfRange { min_year, max_year });
    }
    Ok(())
}

/// Keep `position <= top` and order by position (song id breaks ties)
pub fn limit_to_top(mut entries: Vec<ChartEntry>, top: i32) -> Vec<ChartEntry> {
    entries.retain(|e| e.position <= top);
    sort_by_position(&mut entries);
    entries
}

fn sort_by_position(entries: &mut [ChartEntry]) {
    entries.sort_by(|a, b| a.position.cmp(&b.position).then(a.song_id.cmp(&b.song_id)));
}

/// Validate `year` and fetch the working set
///
/// The year range is checked first; the remaining fetches are independent
/// and run concurrently.
pub async fn reconcile(
    source: &dyn ChartDataSource,
    year: i32,
    top: i32,
) -> Result<WorkingSet, StatsError> {
    let range = source.min_max_years().await?;
    check_year(range, year)?;

    let (this_year, prev_all, earlier, classics, one_hits, precomputed_reentries) =
        tokio::try_join!(
            source.entries_for_year(year, Some(top)),
            source.entries_for_year(year - 1, None),
            source.song_ids_charted_before(year - 1),
            source.all_time_classics(),
            source.one_hit_wonders(),
            source.reentries_for_year(year, top),
        )?;

    let charts = WorkingSet::from_charts(year, top, this_year, prev_all);

    debug!(
        "Working set for {}: {} entries in top {}, {} last year, {} earlier songs",
        year,
        charts.this_top.len(),
        top,
        charts.prev_all.len(),
        earlier.len()
    );

    Ok(WorkingSet {
        earlier_song_ids: earlier.into_iter().collect(),
        classics,
        one_hits,
        precomputed_reentries,
        ..charts
    })
}
