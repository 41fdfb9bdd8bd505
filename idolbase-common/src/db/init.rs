//! Database initialization
//!
//! Creates the idolbase schema on first run. All statements are idempotent
//! (`CREATE TABLE IF NOT EXISTS`), so startup against an existing database is
//! safe and leaves existing rows untouched.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys; the seed pipeline relies on the database rejecting
    // dangling association rows.
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL mode allows concurrent readers once the application starts serving
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all idolbase tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_members_table(pool).await?;
    create_member_lines_table(pool).await?;
    create_eras_table(pool).await?;
    create_albums_table(pool).await?;
    create_member_albums_table(pool).await?;
    create_songs_table(pool).await?;
    create_song_members_table(pool).await?;
    create_music_videos_table(pool).await?;

    info!("Database schema initialized");
    Ok(())
}

/// Create the members table
///
/// Stage name is the natural key used by seed documents to cross-reference
/// members before surrogate ids exist.
pub async fn create_members_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            guid TEXT PRIMARY KEY,
            stage_name TEXT NOT NULL UNIQUE,
            real_name TEXT NOT NULL,
            birthday TEXT NOT NULL,
            position TEXT NOT NULL,
            image_path TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_members_stage_name ON members(stage_name)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the member_lines table
///
/// Line assignments are a small closed set of category labels per member.
pub async fn create_member_lines_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS member_lines (
            member_id TEXT NOT NULL REFERENCES members(guid) ON DELETE CASCADE,
            line TEXT NOT NULL CHECK (line IN ('VOCAL_LINE', 'RAP_LINE', 'DANCE_LINE', 'HYUNG_LINE', 'MAKNAE_LINE')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (member_id, line)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_member_lines_member ON member_lines(member_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the eras table
pub async fn create_eras_table(pool: &SqlitePool) -> Result<()> {
    // ISO-8601 TEXT dates compare lexicographically, so the CHECK holds
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS eras (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            start_date TEXT NOT NULL,
            end_date TEXT,
            description TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (end_date IS NULL OR end_date >= start_date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_eras_name ON eras(name)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the albums table
///
/// Every album belongs to exactly one era.
pub async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            korean_title TEXT,
            album_type TEXT NOT NULL CHECK (album_type IN ('STUDIO', 'MINI', 'SINGLE', 'REPACKAGE', 'COMPILATION', 'SOUNDTRACK')),
            release_date TEXT NOT NULL,
            era_id TEXT NOT NULL REFERENCES eras(guid),
            artist TEXT NOT NULL,
            is_official INTEGER NOT NULL DEFAULT 1,
            cover_image_path TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (title, artist)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_albums_title ON albums(title)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_albums_era ON albums(era_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the member_albums table
///
/// Member-to-album credits, unique per (member, album) pair.
pub async fn create_member_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS member_albums (
            member_id TEXT NOT NULL REFERENCES members(guid) ON DELETE CASCADE,
            album_id TEXT NOT NULL REFERENCES albums(guid) ON DELETE CASCADE,
            role TEXT NOT NULL DEFAULT 'performer',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (member_id, album_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_member_albums_album ON member_albums(album_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the songs table
///
/// The album reference is optional (digital singles have none).
pub async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            korean_title TEXT,
            duration_seconds INTEGER NOT NULL,
            track_number INTEGER,
            is_title INTEGER NOT NULL DEFAULT 0,
            language TEXT NOT NULL,
            featuring_artist TEXT NOT NULL,
            release_date TEXT NOT NULL,
            release_type TEXT NOT NULL,
            artist TEXT NOT NULL,
            url TEXT NOT NULL,
            album_id TEXT REFERENCES albums(guid),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (duration_seconds > 0),
            CHECK (track_number IS NULL OR track_number > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_title ON songs(title)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_album ON songs(album_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the song_members table
///
/// Song-to-member credits, unique per (song, member) pair.
pub async fn create_song_members_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_members (
            song_id TEXT NOT NULL REFERENCES songs(guid) ON DELETE CASCADE,
            member_id TEXT NOT NULL REFERENCES members(guid) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (song_id, member_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_song_members_member ON song_members(member_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the music_videos table
///
/// Every music video references exactly one song.
pub async fn create_music_videos_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS music_videos (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            release_date TEXT NOT NULL,
            video_type TEXT NOT NULL CHECK (video_type IN ('OFFICIAL', 'PERFORMANCE', 'DANCE_PRACTICE', 'TEASER', 'LYRIC')),
            url TEXT NOT NULL,
            song_id TEXT NOT NULL REFERENCES songs(guid),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_music_videos_song ON music_videos(song_id)")
        .execute(pool)
        .await?;

    Ok(())
}
