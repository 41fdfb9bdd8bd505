//! Pipeline orchestration
//!
//! Runs the five seed stages in fixed dependency order:
//! Members -> Eras -> Albums -> Songs -> MusicVideos. The order is
//! load-bearing: Albums need Eras resolved, Songs need Albums and Members,
//! MusicVideos need Songs. Each stage commits in its own transaction; a fatal
//! error aborts the run before any later stage starts, since later foreign
//! references could not resolve against a half-loaded predecessor.

use sqlx::SqlitePool;
use tracing::info;

use crate::db;

use super::gate;
use super::resolver::{EntityKind, EntityResolver};
use super::source::RecordSource;
use super::stage::SeedStage;
use super::stages::{AlbumsStage, ErasStage, MembersStage, MusicVideosStage, SongsStage};
use super::SeedError;

/// Summary of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub stages_run: usize,
    pub stages_skipped: usize,
    pub records_created: usize,
    pub records_skipped: usize,
    pub warnings: usize,
}

/// Runs the seed stages once, in dependency order
pub struct SeedPipeline {
    pool: SqlitePool,
    source: RecordSource,
}

impl SeedPipeline {
    pub fn new(pool: SqlitePool, source: RecordSource) -> Self {
        Self { pool, source }
    }

    fn stages() -> Vec<Box<dyn SeedStage>> {
        vec![
            Box::new(MembersStage),
            Box::new(ErasStage),
            Box::new(AlbumsStage),
            Box::new(SongsStage),
            Box::new(MusicVideosStage),
        ]
    }

    /// Run the full pipeline once. A stage whose target set is already
    /// populated is skipped wholesale; its existing natural-key bindings are
    /// loaded from the store so later stages can still resolve references.
    pub async fn run(&self) -> Result<PipelineOutcome, SeedError> {
        let mut resolver = EntityResolver::new();
        let mut outcome = PipelineOutcome::default();

        for stage in Self::stages() {
            let kind = stage.kind();

            if gate::is_populated(&self.pool, kind).await? {
                info!(stage = %kind, "Stage already populated, skipping");
                outcome.stages_skipped += 1;
                self.hydrate_bindings(kind, &mut resolver).await?;
                continue;
            }

            info!(stage = %kind, document = stage.document(), "Running seed stage");

            let mut tx = self.pool.begin().await?;
            let report = stage.run(&self.source, &mut tx, &mut resolver).await?;
            tx.commit().await?;

            info!(
                stage = %kind,
                created = report.created,
                skipped = report.skipped,
                warnings = report.warnings.len(),
                "Stage complete"
            );

            outcome.stages_run += 1;
            outcome.records_created += report.created;
            outcome.records_skipped += report.skipped;
            outcome.warnings += report.warnings.len();
        }

        info!(
            stages_run = outcome.stages_run,
            stages_skipped = outcome.stages_skipped,
            records_created = outcome.records_created,
            records_skipped = outcome.records_skipped,
            warnings = outcome.warnings,
            "Seed pipeline finished"
        );

        Ok(outcome)
    }

    /// Rebuild a skipped stage's natural-key bindings from the store
    async fn hydrate_bindings(
        &self,
        kind: EntityKind,
        resolver: &mut EntityResolver,
    ) -> Result<(), SeedError> {
        let pairs = match kind {
            EntityKind::Members => db::members::stage_name_index(&self.pool).await?,
            EntityKind::Eras => db::eras::name_index(&self.pool).await?,
            EntityKind::Albums => db::albums::title_index(&self.pool).await?,
            EntityKind::Songs => db::songs::title_index(&self.pool).await?,
            // Nothing downstream resolves music videos
            EntityKind::MusicVideos => Vec::new(),
        };

        if !pairs.is_empty() {
            info!(stage = %kind, bindings = pairs.len(), "Hydrated bindings from store");
        }
        resolver.hydrate(kind, pairs);
        Ok(())
    }
}
