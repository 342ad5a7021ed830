//! HTTP API handlers for t2k-api

pub mod artists;
pub mod auth;
pub mod chart;
pub mod health;
pub mod songs;
pub mod statistics;

pub use artists::{get_artists, update_artist};
pub use auth::auth_middleware;
pub use chart::get_chart;
pub use health::{get_build_info, health_routes};
pub use songs::{get_all_songs, get_song_detail, update_song};
pub use statistics::get_statistics;
