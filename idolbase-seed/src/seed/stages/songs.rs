//! Songs stage: songs plus song-member credits
//!
//! The album reference is optional, but when a record names an album it must
//! resolve or the record is skipped. Member credits resolve item by item.

use async_trait::async_trait;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::songs::{self, Song};
use crate::seed::records::SongRecord;
use crate::seed::resolver::{EntityKind, EntityResolver};
use crate::seed::source::RecordSource;
use crate::seed::stage::{RecordOutcome, SeedStage, StageReport};
use crate::seed::SeedError;

pub struct SongsStage;

#[async_trait]
impl SeedStage for SongsStage {
    fn kind(&self) -> EntityKind {
        EntityKind::Songs
    }

    fn document(&self) -> &'static str {
        "songs.json"
    }

    async fn run(
        &self,
        source: &RecordSource,
        conn: &mut SqliteConnection,
        resolver: &mut EntityResolver,
    ) -> Result<StageReport, SeedError> {
        let records: Vec<SongRecord> = source.load(self.document())?;
        let mut report = StageReport::new(self.kind());

        for record in records {
            if resolver.contains(EntityKind::Songs, &record.title) {
                report.record(RecordOutcome::SkippedDuplicate { key: record.title });
                continue;
            }

            let album_id = match &record.album_title {
                Some(album_title) => match resolver.get(EntityKind::Albums, album_title) {
                    Some(id) => Some(id),
                    None => {
                        report.record(RecordOutcome::SkippedUnresolved {
                            reference: format!(
                                "album '{album_title}' for song '{}'",
                                record.title
                            ),
                        });
                        continue;
                    }
                },
                None => None,
            };

            let song = Song {
                guid: Uuid::new_v4(),
                title: record.title,
                korean_title: record.korean_title,
                duration_seconds: record.duration,
                track_number: record.track_number,
                is_title: record.is_title,
                language: record.language,
                featuring_artist: record.featuring_artist,
                release_date: record.release_date,
                release_type: record.release_type,
                artist: record.artist,
                url: record.url,
                album_id,
            };
            songs::insert_song(conn, &song).await?;
            resolver.put(EntityKind::Songs, &song.title, song.guid);

            for stage_name in record.member_names {
                match resolver.get(EntityKind::Members, &stage_name) {
                    Some(member_id) => {
                        if let Err(e) =
                            songs::insert_song_member(conn, song.guid, member_id).await
                        {
                            report.warn(format!(
                                "song '{}': credit for '{stage_name}' dropped: {e}",
                                song.title
                            ));
                        }
                    }
                    None => report.warn(format!(
                        "song '{}': member '{stage_name}' not found; credit dropped",
                        song.title
                    )),
                }
            }

            report.record(RecordOutcome::Created);
        }

        Ok(report)
    }
}
