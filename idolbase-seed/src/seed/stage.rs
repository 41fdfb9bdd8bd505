//! Stage execution primitives
//!
//! Record processing is expressed as result accumulation: each record yields a
//! tagged outcome that the stage folds into a `StageReport`, so skipping a
//! defective record never relies on error control flow.

use async_trait::async_trait;
use sqlx::SqliteConnection;

use super::resolver::{EntityKind, EntityResolver};
use super::source::RecordSource;
use super::SeedError;

/// Outcome of processing one source record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Entity persisted and its natural key bound
    Created,
    /// A required foreign natural-key reference did not resolve
    SkippedUnresolved { reference: String },
    /// The record's own natural key was already seen in this run
    SkippedDuplicate { key: String },
    /// The record violates a domain invariant (e.g. inverted date range)
    SkippedInvalid { reason: String },
}

/// Aggregated result of one stage run
#[derive(Debug)]
pub struct StageReport {
    kind: EntityKind,
    pub created: usize,
    pub skipped: usize,
    pub warnings: Vec<String>,
}

impl StageReport {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            created: 0,
            skipped: 0,
            warnings: Vec::new(),
        }
    }

    /// Fold one record outcome into the report
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Created => self.created += 1,
            RecordOutcome::SkippedUnresolved { reference } => {
                self.skipped += 1;
                self.warn(format!("unresolved reference: {reference}"));
            }
            RecordOutcome::SkippedDuplicate { key } => {
                self.skipped += 1;
                self.warn(format!("duplicate natural key '{key}'; first occurrence wins"));
            }
            RecordOutcome::SkippedInvalid { reason } => {
                self.skipped += 1;
                self.warn(format!("invalid record: {reason}"));
            }
        }
    }

    /// Log a warning and keep it for the pipeline summary
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(stage = %self.kind, "{message}");
        self.warnings.push(message);
    }
}

/// One ordered unit of the pipeline: loads exactly one entity kind and its
/// direct associations.
#[async_trait]
pub trait SeedStage: Send + Sync {
    /// Entity kind this stage produces
    fn kind(&self) -> EntityKind;

    /// Name of the stage's seed document
    fn document(&self) -> &'static str;

    /// Process every record of the stage document, in document order, inside
    /// the transaction owned by the orchestrator. Record- and
    /// association-level problems are reported in the `StageReport`; only
    /// decode failures and primary-entity storage failures return `Err`.
    async fn run(
        &self,
        source: &RecordSource,
        conn: &mut SqliteConnection,
        resolver: &mut EntityResolver,
    ) -> Result<StageReport, SeedError>;
}
