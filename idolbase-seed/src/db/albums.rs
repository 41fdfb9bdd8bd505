//! Album persistence
//!
//! Albums reference their era by surrogate id and carry member credits in the
//! member_albums join table.

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Role label recorded on member-album credits built from seed documents
pub const DEFAULT_CREDIT_ROLE: &str = "performer";

/// Album release categories (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlbumType {
    Studio,
    Mini,
    Single,
    Repackage,
    Compilation,
    Soundtrack,
}

impl AlbumType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Studio => "STUDIO",
            Self::Mini => "MINI",
            Self::Single => "SINGLE",
            Self::Repackage => "REPACKAGE",
            Self::Compilation => "COMPILATION",
            Self::Soundtrack => "SOUNDTRACK",
        }
    }
}

impl std::str::FromStr for AlbumType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "STUDIO" => Ok(Self::Studio),
            "MINI" => Ok(Self::Mini),
            "SINGLE" => Ok(Self::Single),
            "REPACKAGE" => Ok(Self::Repackage),
            "COMPILATION" => Ok(Self::Compilation),
            "SOUNDTRACK" => Ok(Self::Soundtrack),
            other => Err(anyhow::anyhow!("Unknown album type: {other}")),
        }
    }
}

/// Album record
#[derive(Debug, Clone)]
pub struct Album {
    pub guid: Uuid,
    pub title: String,
    pub korean_title: Option<String>,
    pub album_type: AlbumType,
    pub release_date: NaiveDate,
    pub era_id: Uuid,
    pub artist: String,
    pub is_official: bool,
    pub cover_image_path: String,
    pub description: String,
}

/// Insert an album row. Fails on a duplicate (title, artist) pair or a
/// dangling era reference.
pub async fn insert_album(conn: &mut SqliteConnection, album: &Album) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO albums (guid, title, korean_title, album_type, release_date,
                            era_id, artist, is_official, cover_image_path, description)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(album.guid.to_string())
    .bind(&album.title)
    .bind(&album.korean_title)
    .bind(album.album_type.as_str())
    .bind(album.release_date)
    .bind(album.era_id.to_string())
    .bind(&album.artist)
    .bind(album.is_official)
    .bind(&album.cover_image_path)
    .bind(&album.description)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Record a member credit on an album. Duplicate (member, album) pairs are
/// ignored.
pub async fn insert_member_album(
    conn: &mut SqliteConnection,
    member_id: Uuid,
    album_id: Uuid,
    role: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO member_albums (member_id, album_id, role)
        VALUES (?, ?, ?)
        ON CONFLICT(member_id, album_id) DO NOTHING
        "#,
    )
    .bind(member_id.to_string())
    .bind(album_id.to_string())
    .bind(role)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load an album by title
pub async fn load_album_by_title(pool: &SqlitePool, title: &str) -> Result<Option<Album>> {
    let row = sqlx::query(
        r#"
        SELECT guid, title, korean_title, album_type, release_date,
               era_id, artist, is_official, cover_image_path, description
        FROM albums
        WHERE title = ?
        "#,
    )
    .bind(title)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let era_id_str: String = row.get("era_id");
            let album_type_str: String = row.get("album_type");

            Ok(Some(Album {
                guid: Uuid::parse_str(&guid_str)?,
                title: row.get("title"),
                korean_title: row.get("korean_title"),
                album_type: album_type_str.parse()?,
                release_date: row.get("release_date"),
                era_id: Uuid::parse_str(&era_id_str)?,
                artist: row.get("artist"),
                is_official: row.get("is_official"),
                cover_image_path: row.get("cover_image_path"),
                description: row.get("description"),
            }))
        }
        None => Ok(None),
    }
}

/// Natural-key index of existing albums (title -> guid)
///
/// Songs resolve albums by title alone, so the index is title-keyed even
/// though the table's uniqueness constraint covers (title, artist).
pub async fn title_index(pool: &SqlitePool) -> Result<Vec<(String, Uuid)>> {
    let rows = sqlx::query("SELECT title, guid FROM albums")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            let guid: String = row.get("guid");
            Ok((row.get("title"), Uuid::parse_str(&guid)?))
        })
        .collect()
}

/// Count album rows (idempotency gate signal)
pub async fn count_albums(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM albums")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
