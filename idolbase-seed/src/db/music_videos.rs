//! Music video persistence

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Music video categories (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoType {
    Official,
    Performance,
    DancePractice,
    Teaser,
    Lyric,
}

impl VideoType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Official => "OFFICIAL",
            Self::Performance => "PERFORMANCE",
            Self::DancePractice => "DANCE_PRACTICE",
            Self::Teaser => "TEASER",
            Self::Lyric => "LYRIC",
        }
    }
}

impl std::str::FromStr for VideoType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OFFICIAL" => Ok(Self::Official),
            "PERFORMANCE" => Ok(Self::Performance),
            "DANCE_PRACTICE" => Ok(Self::DancePractice),
            "TEASER" => Ok(Self::Teaser),
            "LYRIC" => Ok(Self::Lyric),
            other => Err(anyhow::anyhow!("Unknown video type: {other}")),
        }
    }
}

/// Music video record
#[derive(Debug, Clone)]
pub struct MusicVideo {
    pub guid: Uuid,
    pub title: String,
    pub release_date: NaiveDate,
    pub video_type: VideoType,
    pub url: String,
    pub song_id: Uuid,
}

/// Insert a music video row. Fails on a dangling song reference.
pub async fn insert_music_video(conn: &mut SqliteConnection, video: &MusicVideo) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO music_videos (guid, title, release_date, video_type, url, song_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(video.guid.to_string())
    .bind(&video.title)
    .bind(video.release_date)
    .bind(video.video_type.as_str())
    .bind(&video.url)
    .bind(video.song_id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load a music video by title
pub async fn load_music_video_by_title(
    pool: &SqlitePool,
    title: &str,
) -> Result<Option<MusicVideo>> {
    let row = sqlx::query(
        r#"
        SELECT guid, title, release_date, video_type, url, song_id
        FROM music_videos
        WHERE title = ?
        "#,
    )
    .bind(title)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let song_id_str: String = row.get("song_id");
            let video_type_str: String = row.get("video_type");

            Ok(Some(MusicVideo {
                guid: Uuid::parse_str(&guid_str)?,
                title: row.get("title"),
                release_date: row.get("release_date"),
                video_type: video_type_str.parse()?,
                url: row.get("url"),
                song_id: Uuid::parse_str(&song_id_str)?,
            }))
        }
        None => Ok(None),
    }
}

/// Count music video rows (idempotency gate signal)
pub async fn count_music_videos(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM music_videos")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::songs;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        idolbase_common::db::create_eras_table(&pool).await.unwrap();
        idolbase_common::db::create_albums_table(&pool).await.unwrap();
        idolbase_common::db::create_songs_table(&pool).await.unwrap();
        idolbase_common::db::create_music_videos_table(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_and_load_music_video() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let song = songs::Song {
            guid: Uuid::new_v4(),
            title: "Spring Day".to_string(),
            korean_title: None,
            duration_seconds: 285,
            track_number: None,
            is_title: true,
            language: "Korean".to_string(),
            featuring_artist: String::new(),
            release_date: NaiveDate::from_ymd_opt(2017, 2, 13).unwrap(),
            release_type: "single".to_string(),
            artist: "BTS".to_string(),
            url: "https://example.org/spring-day".to_string(),
            album_id: None,
        };
        songs::insert_song(&mut conn, &song).await.unwrap();

        let video = MusicVideo {
            guid: Uuid::new_v4(),
            title: "Spring Day MV".to_string(),
            release_date: NaiveDate::from_ymd_opt(2017, 2, 13).unwrap(),
            video_type: VideoType::Official,
            url: "https://example.org/spring-day-mv".to_string(),
            song_id: song.guid,
        };
        insert_music_video(&mut conn, &video).await.expect("Failed to insert music video");

        let loaded = load_music_video_by_title(&pool, "Spring Day MV")
            .await
            .expect("Failed to load music video")
            .expect("Music video not found");

        assert_eq!(loaded.song_id, song.guid);
        assert_eq!(loaded.video_type, VideoType::Official);
    }

    #[tokio::test]
    async fn test_dangling_song_reference_rejected() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let video = MusicVideo {
            guid: Uuid::new_v4(),
            title: "Orphan MV".to_string(),
            release_date: NaiveDate::from_ymd_opt(2017, 2, 13).unwrap(),
            video_type: VideoType::Official,
            url: "https://example.org/orphan".to_string(),
            song_id: Uuid::new_v4(),
        };
        assert!(insert_music_video(&mut conn, &video).await.is_err());
        assert_eq!(count_music_videos(&pool).await.unwrap(), 0);
    }
}
