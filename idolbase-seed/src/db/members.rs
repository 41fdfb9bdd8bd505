//! Member persistence
//!
//! Members are the first stage of the seed pipeline; every later stage may
//! reference them by stage name.

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Line assignment category labels (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineTag {
    VocalLine,
    RapLine,
    DanceLine,
    HyungLine,
    MaknaeLine,
}

impl LineTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VocalLine => "VOCAL_LINE",
            Self::RapLine => "RAP_LINE",
            Self::DanceLine => "DANCE_LINE",
            Self::HyungLine => "HYUNG_LINE",
            Self::MaknaeLine => "MAKNAE_LINE",
        }
    }
}

impl std::str::FromStr for LineTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "VOCAL_LINE" => Ok(Self::VocalLine),
            "RAP_LINE" => Ok(Self::RapLine),
            "DANCE_LINE" => Ok(Self::DanceLine),
            "HYUNG_LINE" => Ok(Self::HyungLine),
            "MAKNAE_LINE" => Ok(Self::MaknaeLine),
            other => Err(anyhow::anyhow!("Unknown line tag: {other}")),
        }
    }
}

/// Member record (artist roster entry)
#[derive(Debug, Clone)]
pub struct Member {
    pub guid: Uuid,
    pub stage_name: String,
    pub real_name: String,
    pub birthday: NaiveDate,
    pub position: String,
    pub image_path: String,
}

/// Insert a member row. Fails on a duplicate stage name (UNIQUE constraint).
pub async fn insert_member(conn: &mut SqliteConnection, member: &Member) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO members (guid, stage_name, real_name, birthday, position, image_path)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(member.guid.to_string())
    .bind(&member.stage_name)
    .bind(&member.real_name)
    .bind(member.birthday)
    .bind(&member.position)
    .bind(&member.image_path)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Attach a line assignment to a member. Duplicate (member, line) pairs are
/// ignored.
pub async fn insert_member_line(
    conn: &mut SqliteConnection,
    member_id: Uuid,
    line: LineTag,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO member_lines (member_id, line)
        VALUES (?, ?)
        ON CONFLICT(member_id, line) DO NOTHING
        "#,
    )
    .bind(member_id.to_string())
    .bind(line.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load a member by stage name
pub async fn load_member_by_stage_name(
    pool: &SqlitePool,
    stage_name: &str,
) -> Result<Option<Member>> {
    let row = sqlx::query(
        r#"
        SELECT guid, stage_name, real_name, birthday, position, image_path
        FROM members
        WHERE stage_name = ?
        "#,
    )
    .bind(stage_name)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");

            Ok(Some(Member {
                guid: Uuid::parse_str(&guid_str)?,
                stage_name: row.get("stage_name"),
                real_name: row.get("real_name"),
                birthday: row.get("birthday"),
                position: row.get("position"),
                image_path: row.get("image_path"),
            }))
        }
        None => Ok(None),
    }
}

/// Load the line assignments of a member
pub async fn load_member_lines(pool: &SqlitePool, member_id: Uuid) -> Result<Vec<LineTag>> {
    let rows = sqlx::query("SELECT line FROM member_lines WHERE member_id = ? ORDER BY line")
        .bind(member_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| row.get::<String, _>("line").parse())
        .collect()
}

/// Natural-key index of existing members (stage name -> guid)
pub async fn stage_name_index(pool: &SqlitePool) -> Result<Vec<(String, Uuid)>> {
    let rows = sqlx::query("SELECT stage_name, guid FROM members")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            let guid: String = row.get("guid");
            Ok((row.get("stage_name"), Uuid::parse_str(&guid)?))
        })
        .collect()
}

/// Count member rows (idempotency gate signal)
pub async fn count_members(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM members")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
