//! Seed document record shapes
//!
//! One JSON document per stage, each an ordered array of records. Field names
//! are camelCase in the documents; enum values are SCREAMING_SNAKE_CASE and
//! dates are ISO-8601 (`YYYY-MM-DD`). A field that cannot be coerced to its
//! declared type makes the whole document undecodable, which is fatal.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::db::albums::AlbumType;
use crate::db::members::LineTag;
use crate::db::music_videos::VideoType;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub stage_name: String,
    pub real_name: String,
    pub birthday: NaiveDate,
    pub position: String,
    pub image_path: String,
    #[serde(default)]
    pub line_tags: Vec<LineTag>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraRecord {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRecord {
    pub title: String,
    pub korean_title: Option<String>,
    pub album_type: AlbumType,
    pub release_date: NaiveDate,
    /// Era reference by natural key; must resolve or the record is skipped
    pub era_name: String,
    pub artist: String,
    pub is_official: bool,
    pub cover_image_path: String,
    pub description: String,
    /// Member credits by stage name, resolved item by item
    #[serde(default)]
    pub member_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    pub title: String,
    pub korean_title: Option<String>,
    /// Duration in seconds
    pub duration: i64,
    pub track_number: Option<i64>,
    pub is_title: bool,
    pub language: String,
    pub featuring_artist: String,
    pub release_date: NaiveDate,
    pub release_type: String,
    pub artist: String,
    pub url: String,
    /// Album reference by title; absent for stand-alone releases, but when
    /// present it must resolve or the record is skipped
    pub album_title: Option<String>,
    /// Member credits by stage name, resolved item by item
    #[serde(default)]
    pub member_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicVideoRecord {
    pub title: String,
    pub release_date: NaiveDate,
    pub video_type: VideoType,
    pub url: String,
    /// Song reference by title; must resolve or the record is skipped
    pub song_title: String,
}
