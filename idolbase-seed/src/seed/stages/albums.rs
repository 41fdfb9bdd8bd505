//! Albums stage: albums plus member-album credits
//!
//! Albums require their era to be resolved; a record whose era is unknown is
//! skipped. Member credits resolve item by item, so one unknown stage name
//! drops that credit without discarding the album. The album natural key is
//! (title, artist); a repeated title under a different artist persists, but
//! only the first occurrence of a title is bound for song resolution.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::albums::{self, Album, DEFAULT_CREDIT_ROLE};
use crate::seed::records::AlbumRecord;
use crate::seed::resolver::{EntityKind, EntityResolver};
use crate::seed::source::RecordSource;
use crate::seed::stage::{RecordOutcome, SeedStage, StageReport};
use crate::seed::SeedError;

pub struct AlbumsStage;

#[async_trait]
impl SeedStage for AlbumsStage {
    fn kind(&self) -> EntityKind {
        EntityKind::Albums
    }

    fn document(&self) -> &'static str {
        "albums.json"
    }

    async fn run(
        &self,
        source: &RecordSource,
        conn: &mut SqliteConnection,
        resolver: &mut EntityResolver,
    ) -> Result<StageReport, SeedError> {
        let records: Vec<AlbumRecord> = source.load(self.document())?;
        let mut report = StageReport::new(self.kind());
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for record in records {
            if !seen.insert((record.title.clone(), record.artist.clone())) {
                report.record(RecordOutcome::SkippedDuplicate {
                    key: format!("{} / {}", record.title, record.artist),
                });
                continue;
            }

            let Some(era_id) = resolver.get(EntityKind::Eras, &record.era_name) else {
                report.record(RecordOutcome::SkippedUnresolved {
                    reference: format!("era '{}' for album '{}'", record.era_name, record.title),
                });
                continue;
            };

            let album = Album {
                guid: Uuid::new_v4(),
                title: record.title,
                korean_title: record.korean_title,
                album_type: record.album_type,
                release_date: record.release_date,
                era_id,
                artist: record.artist,
                is_official: record.is_official,
                cover_image_path: record.cover_image_path,
                description: record.description,
            };
            albums::insert_album(conn, &album).await?;

            // Bindings are title-keyed because songs reference albums by
            // title alone. A same-titled album under another artist persists,
            // but songs naming that title resolve to the first occurrence.
            if !resolver.put(EntityKind::Albums, &album.title, album.guid) {
                report.warn(format!(
                    "album '{}' by '{}': title already bound; songs referencing it resolve to the earlier album",
                    album.title, album.artist
                ));
            }

            for stage_name in record.member_keys {
                match resolver.get(EntityKind::Members, &stage_name) {
                    Some(member_id) => {
                        if let Err(e) = albums::insert_member_album(
                            conn,
                            member_id,
                            album.guid,
                            DEFAULT_CREDIT_ROLE,
                        )
                        .await
                        {
                            report.warn(format!(
                                "album '{}': credit for '{stage_name}' dropped: {e}",
                                album.title
                            ));
                        }
                    }
                    None => report.warn(format!(
                        "album '{}': member '{stage_name}' not found; credit dropped",
                        album.title
                    )),
                }
            }

            report.record(RecordOutcome::Created);
        }

        Ok(report)
    }
}
