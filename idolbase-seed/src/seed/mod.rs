//! Startup seed pipeline
//!
//! Seeds the relational domain model from JSON documents, once, in dependency
//! order. Stages run Members -> Eras -> Albums -> Songs -> MusicVideos; each
//! stage persists its entities and publishes natural-key bindings that later
//! stages consume to resolve foreign references.

pub mod gate;
pub mod orchestrator;
pub mod records;
pub mod resolver;
pub mod source;
pub mod stage;
pub mod stages;

use thiserror::Error;

/// Fatal pipeline errors. Record- and association-level problems never take
/// this form; they are accumulated as `StageReport` warnings instead.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Seed document missing or structurally invalid
    #[error("seed document '{document}' could not be loaded: {reason}")]
    Source { document: String, reason: String },

    /// Storage unavailable or primary-entity persist failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub use orchestrator::{PipelineOutcome, SeedPipeline};
pub use resolver::{EntityKind, EntityResolver};
pub use source::RecordSource;
pub use stage::{RecordOutcome, SeedStage, StageReport};
