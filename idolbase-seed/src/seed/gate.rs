//! Per-stage idempotency gate
//!
//! A stage is skipped when its target table already holds rows. The signal is
//! coarse: it cannot tell a fully loaded stage from one interrupted mid-run.
//! Each stage commits in a single transaction, so an interrupted stage leaves
//! zero rows behind and the gate stays open for the next run.

use sqlx::SqlitePool;

use crate::db;

use super::resolver::EntityKind;
use super::SeedError;

/// True when the kind's target table already contains at least one row
pub async fn is_populated(pool: &SqlitePool, kind: EntityKind) -> Result<bool, SeedError> {
    let count = match kind {
        EntityKind::Members => db::members::count_members(pool).await?,
        EntityKind::Eras => db::eras::count_eras(pool).await?,
        EntityKind::Albums => db::albums::count_albums(pool).await?,
        EntityKind::Songs => db::songs::count_songs(pool).await?,
        EntityKind::MusicVideos => db::music_videos::count_music_videos(pool).await?,
    };
    Ok(count > 0)
}
