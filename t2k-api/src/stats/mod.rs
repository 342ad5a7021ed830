//! Year-over-year chart statistics
//!
//! The report for a year is built in stages, each a plain function over the
//! working set:
//!
//! 1. [`reconcile`]: validate the year, fetch both years and history
//! 2. [`movement`], [`adjacent`], [`artists`]: independent passes over the
//!    working set
//! 3. [`reentry`]: split new entries into debuts and re-entries
//! 4. [`report`]: merge everything and build the UI cards
//!
//! Nothing is cached between calls; every report is computed from the data
//! source as it is at that moment.

use thiserror::Error;
use tracing::info;

use crate::models::StatisticsReport;
use crate::source::ChartDataSource;

pub mod adjacent;
pub mod artists;
pub mod movement;
pub mod reconcile;
pub mod reentry;
pub mod report;

pub const DEFAULT_TOP: i32 = 10;
pub const DEFAULT_TOP_ARTISTS: i32 = 3;

/// Statistics failures
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("No chart data available")]
    NoDataAvailable,

    #[error("Year out of range (available years: {min_year}-{max_year})")]
    YearOutOfRange { min_year: i32, max_year: i32 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Both the optimized and the relational query failed
    #[error(transparent)]
    Source(#[from] t2k_common::Error),
}

/// Compute the statistics report for `year`
///
/// `top` is the chart window compared against last year (>= 1);
/// `top_artists` is the minimum number of leading artists reported (>= 0).
pub async fn compute_statistics(
    source: &dyn ChartDataSource,
    year: i32,
    top: i32,
    top_artists: i32,
) -> Result<StatisticsReport, StatsError> {
    reconcile::validate_params(top, top_artists)?;

    let working = reconcile::reconcile(source, year, top).await?;

    let classification = movement::classify(&working);
    let adjacent_sequences = adjacent::detect_runs(&working.this_top);
    let adjacent_runs = adjacent::flatten_runs(&adjacent_sequences);
    let artists = artists::aggregate(
        &working.this_top,
        usize::try_from(top_artists).unwrap_or_default(),
    );

    let reentries = reentry::resolve(
        source,
        year,
        &classification.new_entries,
        &working.earlier_song_ids,
        working.precomputed_reentries.as_deref(),
    )
    .await?;

    info!(
        "Statistics for {} (top {}): {} rises, {} falls, {} new, {} re-entries, {} dropped",
        year,
        top,
        classification.rises.len(),
        classification.falls.len(),
        reentries.pure_new.len(),
        reentries.reentries.len(),
        classification.dropped.len()
    );

    Ok(report::assemble(report::StageOutputs {
        year,
        top,
        top_artists,
        classification,
        reentries,
        adjacent_sequences,
        adjacent_runs,
        artists,
        classics: working.classics,
        one_hits: working.one_hits,
    }))
}
