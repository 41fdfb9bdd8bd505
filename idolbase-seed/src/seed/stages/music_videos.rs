//! Music videos stage
//!
//! Every music video must resolve its song; unresolved records are skipped.
//! Music videos carry no natural key, so titles may repeat (an official cut
//! and a dance practice often share one) and nothing downstream resolves
//! them.

use async_trait::async_trait;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::music_videos::{self, MusicVideo};
use crate::seed::records::MusicVideoRecord;
use crate::seed::resolver::{EntityKind, EntityResolver};
use crate::seed::source::RecordSource;
use crate::seed::stage::{RecordOutcome, SeedStage, StageReport};
use crate::seed::SeedError;

pub struct MusicVideosStage;

#[async_trait]
impl SeedStage for MusicVideosStage {
    fn kind(&self) -> EntityKind {
        EntityKind::MusicVideos
    }

    fn document(&self) -> &'static str {
        "music_videos.json"
    }

    async fn run(
        &self,
        source: &RecordSource,
        conn: &mut SqliteConnection,
        resolver: &mut EntityResolver,
    ) -> Result<StageReport, SeedError> {
        let records: Vec<MusicVideoRecord> = source.load(self.document())?;
        let mut report = StageReport::new(self.kind());

        for record in records {
            let Some(song_id) = resolver.get(EntityKind::Songs, &record.song_title) else {
                report.record(RecordOutcome::SkippedUnresolved {
                    reference: format!(
                        "song '{}' for music video '{}'",
                        record.song_title, record.title
                    ),
                });
                continue;
            };

            let video = MusicVideo {
                guid: Uuid::new_v4(),
                title: record.title,
                release_date: record.release_date,
                video_type: record.video_type,
                url: record.url,
                song_id,
            };
            music_videos::insert_music_video(conn, &video).await?;
            report.record(RecordOutcome::Created);
        }

        Ok(report)
    }
}
