//! Members stage: members and their line assignments

use async_trait::async_trait;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::members::{self, Member};
use crate::seed::records::MemberRecord;
use crate::seed::resolver::{EntityKind, EntityResolver};
use crate::seed::source::RecordSource;
use crate::seed::stage::{RecordOutcome, SeedStage, StageReport};
use crate::seed::SeedError;

pub struct MembersStage;

#[async_trait]
impl SeedStage for MembersStage {
    fn kind(&self) -> EntityKind {
        EntityKind::Members
    }

    fn document(&self) -> &'static str {
        "members.json"
    }

    async fn run(
        &self,
        source: &RecordSource,
        conn: &mut SqliteConnection,
        resolver: &mut EntityResolver,
    ) -> Result<StageReport, SeedError> {
        let records: Vec<MemberRecord> = source.load(self.document())?;
        let mut report = StageReport::new(self.kind());

        for record in records {
            if resolver.contains(EntityKind::Members, &record.stage_name) {
                report.record(RecordOutcome::SkippedDuplicate { key: record.stage_name });
                continue;
            }

            let member = Member {
                guid: Uuid::new_v4(),
                stage_name: record.stage_name.clone(),
                real_name: record.real_name,
                birthday: record.birthday,
                position: record.position,
                image_path: record.image_path,
            };
            members::insert_member(conn, &member).await?;
            resolver.put(EntityKind::Members, &member.stage_name, member.guid);

            // Line assignments reference the member created just above; a
            // failed line insert drops that line only, never the member.
            for line in record.line_tags {
                if let Err(e) = members::insert_member_line(conn, member.guid, line).await {
                    report.warn(format!(
                        "member '{}': line {} dropped: {e}",
                        member.stage_name,
                        line.as_str()
                    ));
                }
            }

            report.record(RecordOutcome::Created);
        }

        Ok(report)
    }
}
