//! Database initialization
//!
//! Opens (or creates) the chart database and makes sure the base schema exists.
//! Creation is idempotent; existing data is never touched.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Connections kept by the pool. Statistics requests fan out several
/// independent queries, so a handful of readers is useful.
const MAX_CONNECTIONS: u32 = 8;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Pragmas go through connect options so every pooled connection gets them
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all base tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_artists_table(pool).await?;
    create_songs_table(pool).await?;
    create_chart_entries_table(pool).await?;
    create_chart_version_triggers(pool).await?;
    Ok(())
}

pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            artist_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            wiki TEXT,
            biography TEXT,
            photo TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_artists_name ON artists(name COLLATE NOCASE)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            song_id INTEGER PRIMARY KEY,
            artist_id INTEGER NOT NULL REFERENCES artists(artist_id),
            title TEXT NOT NULL,
            release_year INTEGER,
            img_url TEXT,
            lyrics TEXT,
            youtube TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_artist ON songs(artist_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// One row per (song, year); a position is held by exactly one song per year
pub async fn create_chart_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chart_entries (
            song_id INTEGER NOT NULL REFERENCES songs(song_id),
            year INTEGER NOT NULL,
            position INTEGER NOT NULL CHECK (position > 0),
            PRIMARY KEY (song_id, year),
            UNIQUE (year, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chart_entries_year ON chart_entries(year, position)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Settings key counting changes to the chart data the summaries copy
pub const CHART_DATA_VERSION_KEY: &str = "chart_data_version";

/// Bump `settings.chart_data_version` on every change to charted data
///
/// Covers chart rows plus the song and artist columns copied into
/// `chart_rows`. Summary readers compare this counter with the one stored by
/// the last refresh.
pub async fn create_chart_version_triggers(pool: &SqlitePool) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, '0')")
        .bind(CHART_DATA_VERSION_KEY)
        .execute(pool)
        .await?;

    let watched = [
        ("chart_entries_insert", "INSERT ON chart_entries"),
        ("chart_entries_update", "UPDATE ON chart_entries"),
        ("chart_entries_delete", "DELETE ON chart_entries"),
        ("songs_insert", "INSERT ON songs"),
        ("songs_update", "UPDATE OF artist_id, title, release_year ON songs"),
        ("songs_delete", "DELETE ON songs"),
        ("artists_update", "UPDATE OF name ON artists"),
        ("artists_delete", "DELETE ON artists"),
    ];

    for (name, event) in watched {
        let sql = format!(
            r#"
            CREATE TRIGGER IF NOT EXISTS bump_chart_version_{name}
            AFTER {event}
            BEGIN
                UPDATE settings SET value = CAST(value AS INTEGER) + 1
                WHERE key = '{key}';
            END
            "#,
            name = name,
            event = event,
            key = CHART_DATA_VERSION_KEY
        );
        sqlx::query(&sql).execute(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_database_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("top2000.db");

        let pool = init_database(&db_path).await.expect("init should succeed");
        assert!(db_path.exists());

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["artists", "chart_entries", "settings", "songs"]);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("top2000.db");

        let pool = init_database(&db_path).await.unwrap();
        sqlx::query("INSERT INTO artists (artist_id, name) VALUES (1, 'Queen')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        // Reopening must keep existing rows
        let pool = init_database(&db_path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_position_unique_per_year() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("top2000.db")).await.unwrap();

        sqlx::query("INSERT INTO artists (artist_id, name) VALUES (1, 'Queen')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO songs (song_id, artist_id, title) VALUES (1, 1, 'Bohemian Rhapsody'), (2, 1, 'Love of My Life')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO chart_entries (song_id, year, position) VALUES (1, 2020, 1)")
            .execute(&pool)
            .await
            .unwrap();

        let duplicate = sqlx::query("INSERT INTO chart_entries (song_id, year, position) VALUES (2, 2020, 1)")
            .execute(&pool)
            .await;
        assert!(duplicate.is_err(), "Two songs cannot share a position in one year");
    }

    async fn chart_data_version(pool: &SqlitePool) -> i64 {
        let value: String = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(CHART_DATA_VERSION_KEY)
            .fetch_one(pool)
            .await
            .unwrap();
        value.parse().unwrap()
    }

    #[tokio::test]
    async fn test_chart_changes_bump_data_version() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("top2000.db")).await.unwrap();
        assert_eq!(chart_data_version(&pool).await, 0);

        sqlx::query("INSERT INTO artists (artist_id, name) VALUES (1, 'Queen')")
            .execute(&pool)
            .await
            .unwrap();
        // New artists have no chart rows yet
        assert_eq!(chart_data_version(&pool).await, 0);

        sqlx::query("INSERT INTO songs (song_id, artist_id, title) VALUES (1, 1, 'Bohemian Rhapsody')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO chart_entries (song_id, year, position) VALUES (1, 2020, 1)")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(chart_data_version(&pool).await, 2);

        // Columns not copied into the summaries leave the version alone
        sqlx::query("UPDATE songs SET lyrics = 'Is this the real life?' WHERE song_id = 1")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("UPDATE artists SET wiki = 'https://en.wikipedia.org/wiki/Queen' WHERE artist_id = 1")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(chart_data_version(&pool).await, 2);

        sqlx::query("UPDATE artists SET name = 'Queen + Adam Lambert' WHERE artist_id = 1")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(chart_data_version(&pool).await, 3);

        // Reopening keeps the counter
        pool.close().await;
        let pool = init_database(&temp_dir.path().join("top2000.db")).await.unwrap();
        assert_eq!(chart_data_version(&pool).await, 3);
    }
}
