//! # Top 2000 Common Library
//!
//! Shared code for the Top 2000 chart service:
//! - Error type
//! - Configuration loading and resolution
//! - Database pool and schema initialization
//! - Precomputed chart summary tables
//! - Admin request authentication primitives

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;

pub use error::{Error, Result};

/// Song identifier (`songs.song_id`)
pub type SongId = i64;

/// Artist identifier (`artists.artist_id`)
pub type ArtistId = i64;
