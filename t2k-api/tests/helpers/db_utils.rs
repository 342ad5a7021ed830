//! Temporary database setup

use sqlx::SqlitePool;
use std::collections::BTreeMap;
use t2k_api::models::ChartEntry;
use t2k_common::db::init_database;
use tempfile::TempDir;

/// Fresh database with the base schema; keep the `TempDir` alive while in use
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let db_path = temp_dir.path().join("top2000.db");
    let pool = init_database(&db_path).await.expect("init database");
    (temp_dir, pool)
}

/// Insert artists, songs and chart entries described by `entries`
pub async fn seed_chart(pool: &SqlitePool, entries: &[ChartEntry]) {
    let artists: BTreeMap<i64, &str> = entries
        .iter()
        .map(|e| (e.artist_id, e.artist_name.as_str()))
        .collect();
    let songs: BTreeMap<i64, &ChartEntry> = entries.iter().map(|e| (e.song_id, e)).collect();

    for (artist_id, name) in artists {
        sqlx::query("INSERT INTO artists (artist_id, name) VALUES (?, ?)")
            .bind(artist_id)
            .bind(name)
            .execute(pool)
            .await
            .expect("insert artist");
    }

    for (song_id, e) in songs {
        sqlx::query(
            "INSERT INTO songs (song_id, artist_id, title, release_year) VALUES (?, ?, ?, ?)",
        )
        .bind(song_id)
        .bind(e.artist_id)
        .bind(&e.title)
        .bind(e.release_year)
        .execute(pool)
        .await
        .expect("insert song");
    }

    for e in entries {
        sqlx::query("INSERT INTO chart_entries (song_id, year, position) VALUES (?, ?, ?)")
            .bind(e.song_id)
            .bind(e.year)
            .bind(e.position)
            .execute(pool)
            .await
            .expect("insert chart entry");
    }
}
