//! Eras stage

use async_trait::async_trait;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::eras::{self, Era};
use crate::seed::records::EraRecord;
use crate::seed::resolver::{EntityKind, EntityResolver};
use crate::seed::source::RecordSource;
use crate::seed::stage::{RecordOutcome, SeedStage, StageReport};
use crate::seed::SeedError;

pub struct ErasStage;

#[async_trait]
impl SeedStage for ErasStage {
    fn kind(&self) -> EntityKind {
        EntityKind::Eras
    }

    fn document(&self) -> &'static str {
        "eras.json"
    }

    async fn run(
        &self,
        source: &RecordSource,
        conn: &mut SqliteConnection,
        resolver: &mut EntityResolver,
    ) -> Result<StageReport, SeedError> {
        let records: Vec<EraRecord> = source.load(self.document())?;
        let mut report = StageReport::new(self.kind());

        for record in records {
            if resolver.contains(EntityKind::Eras, &record.name) {
                report.record(RecordOutcome::SkippedDuplicate { key: record.name });
                continue;
            }

            // Validated here rather than left to the table CHECK so a bad
            // range stays a record-level skip instead of a stage-fatal error.
            if let Some(end) = record.end_date {
                if end < record.start_date {
                    report.record(RecordOutcome::SkippedInvalid {
                        reason: format!(
                            "era '{}' ends {} before it starts {}",
                            record.name, end, record.start_date
                        ),
                    });
                    continue;
                }
            }

            let era = Era {
                guid: Uuid::new_v4(),
                name: record.name,
                start_date: record.start_date,
                end_date: record.end_date,
                description: record.description,
            };
            eras::insert_era(conn, &era).await?;
            resolver.put(EntityKind::Eras, &era.name, era.guid);

            report.record(RecordOutcome::Created);
        }

        Ok(report)
    }
}
