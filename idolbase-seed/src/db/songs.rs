//! Song persistence
//!
//! Songs optionally reference an album and carry member credits in the
//! song_members join table.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Song record
#[derive(Debug, Clone)]
pub struct Song {
    pub guid: Uuid,
    pub title: String,
    pub korean_title: Option<String>,
    pub duration_seconds: i64,
    pub track_number: Option<i64>,
    pub is_title: bool,
    pub language: String,
    pub featuring_artist: String,
    pub release_date: NaiveDate,
    pub release_type: String,
    pub artist: String,
    pub url: String,
    pub album_id: Option<Uuid>,
}

/// Insert a song row. Fails on a duplicate title (UNIQUE constraint) or a
/// dangling album reference.
pub async fn insert_song(conn: &mut SqliteConnection, song: &Song) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (guid, title, korean_title, duration_seconds, track_number,
                           is_title, language, featuring_artist, release_date,
                           release_type, artist, url, album_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(song.guid.to_string())
    .bind(&song.title)
    .bind(&song.korean_title)
    .bind(song.duration_seconds)
    .bind(song.track_number)
    .bind(song.is_title)
    .bind(&song.language)
    .bind(&song.featuring_artist)
    .bind(song.release_date)
    .bind(&song.release_type)
    .bind(&song.artist)
    .bind(&song.url)
    .bind(song.album_id.map(|id| id.to_string()))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Record a member credit on a song. Duplicate (song, member) pairs are
/// ignored.
pub async fn insert_song_member(
    conn: &mut SqliteConnection,
    song_id: Uuid,
    member_id: Uuid,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO song_members (song_id, member_id)
        VALUES (?, ?)
        ON CONFLICT(song_id, member_id) DO NOTHING
        "#,
    )
    .bind(song_id.to_string())
    .bind(member_id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load a song by title
pub async fn load_song_by_title(pool: &SqlitePool, title: &str) -> Result<Option<Song>> {
    let row = sqlx::query(
        r#"
        SELECT guid, title, korean_title, duration_seconds, track_number,
               is_title, language, featuring_artist, release_date,
               release_type, artist, url, album_id
        FROM songs
        WHERE title = ?
        "#,
    )
    .bind(title)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let album_id_str: Option<String> = row.get("album_id");
            let album_id = match album_id_str {
                Some(s) => Some(Uuid::parse_str(&s)?),
                None => None,
            };

            Ok(Some(Song {
                guid: Uuid::parse_str(&guid_str)?,
                title: row.get("title"),
                korean_title: row.get("korean_title"),
                duration_seconds: row.get("duration_seconds"),
                track_number: row.get("track_number"),
                is_title: row.get("is_title"),
                language: row.get("language"),
                featuring_artist: row.get("featuring_artist"),
                release_date: row.get("release_date"),
                release_type: row.get("release_type"),
                artist: row.get("artist"),
                url: row.get("url"),
                album_id,
            }))
        }
        None => Ok(None),
    }
}

/// Member ids credited on a song
pub async fn load_song_member_ids(pool: &SqlitePool, song_id: Uuid) -> Result<Vec<Uuid>> {
    let rows = sqlx::query("SELECT member_id FROM song_members WHERE song_id = ?")
        .bind(song_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            let member_id: String = row.get("member_id");
            Ok(Uuid::parse_str(&member_id)?)
        })
        .collect()
}

/// Natural-key index of existing songs (title -> guid)
pub async fn title_index(pool: &SqlitePool) -> Result<Vec<(String, Uuid)>> {
    let rows = sqlx::query("SELECT title, guid FROM songs")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            let guid: String = row.get("guid");
            Ok((row.get("title"), Uuid::parse_str(&guid)?))
        })
        .collect()
}

/// Count song rows (idempotency gate signal)
pub async fn count_songs(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
