//! Chart data access for the statistics pipeline
//!
//! [`ChartDataSource`] hides where chart data comes from. Two implementations
//! exist side by side:
//! - [`RelationalChartSource`]: joins over the base tables, always available
//! - [`SummaryChartSource`]: reads the precomputed summary tables and fails
//!   when they are missing or older than the chart data
//!
//! [`FallbackChartSource`] pairs them so a failing optimized query is replaced
//! by the relational one without the caller noticing.

use async_trait::async_trait;
use std::collections::HashMap;
use t2k_common::{Result, SongId};

use crate::models::{BasicSongRecord, ChartEntry, OneHitRecord};

pub mod fallback;
pub mod memory;
pub mod relational;
pub mod summary;

pub use fallback::FallbackChartSource;
pub use memory::InMemoryChartSource;
pub use relational::RelationalChartSource;
pub use summary::SummaryChartSource;

/// Read access to yearly chart data
#[async_trait]
pub trait ChartDataSource: Send + Sync {
    /// Earliest and latest chart year, `None` when no entries exist at all
    async fn min_max_years(&self) -> Result<Option<(i32, i32)>>;

    /// Entries of one year, optionally limited to `position <= limit`
    ///
    /// Callers must not rely on ordering or on the limit having been applied.
    async fn entries_for_year(&self, year: i32, position_limit: Option<i32>)
        -> Result<Vec<ChartEntry>>;

    /// Distinct songs charted in any year strictly before `year`
    async fn song_ids_charted_before(&self, year: i32) -> Result<Vec<SongId>>;

    /// Subset of `ids` charted in any year strictly before `year`
    async fn song_ids_charted_before_among(
        &self,
        year: i32,
        ids: &[SongId],
    ) -> Result<Vec<SongId>>;

    /// Most recent position of each song in any year strictly before `year`
    ///
    /// Songs without earlier history are absent from the map.
    async fn latest_positions_before(
        &self,
        year: i32,
        ids: &[SongId],
    ) -> Result<HashMap<SongId, i32>>;

    /// Songs charted in every known year
    async fn all_time_classics(&self) -> Result<Vec<BasicSongRecord>>;

    /// Songs charted in exactly one year
    async fn one_hit_wonders(&self) -> Result<Vec<OneHitRecord>>;

    /// Precomputed re-entries among this year's top `top`
    ///
    /// `Ok(None)` means "not supported here", the caller computes them itself.
    async fn reentries_for_year(&self, year: i32, top: i32)
        -> Result<Option<Vec<BasicSongRecord>>>;
}

/// `?, ?, ?` placeholder list for an `IN (...)` clause
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
