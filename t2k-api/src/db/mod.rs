//! Catalog queries for the pass-through endpoints
//!
//! Chart statistics go through [`crate::source`]; these functions serve the
//! listing, detail and admin update endpoints directly from the base tables.

pub mod artists;
pub mod chart;
pub mod songs;

pub use artists::{artist_chart_rows, load_artist, save_artist};
pub use chart::chart_rows_for_year;
pub use songs::{all_songs, chart_history, load_song, save_song_media};
