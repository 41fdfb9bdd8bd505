//! idolbase-seed - Startup seed runner
//!
//! Seeds the idolbase database from JSON documents before the application
//! begins serving. Each stage runs at most once; re-running against an already
//! seeded database writes nothing. A fatal error (missing document, storage
//! failure) aborts startup with a non-zero exit status.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use idolbase_seed::seed::{RecordSource, SeedPipeline};

#[derive(Parser, Debug)]
#[command(name = "idolbase-seed", about = "Seed the idolbase database from JSON documents")]
struct Args {
    /// Root folder holding the database and seed documents
    #[arg(long)]
    root_folder: Option<String>,

    /// Override the seed document directory (defaults to <root>/seed)
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting idolbase-seed");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let root = idolbase_common::config::resolve_root_folder(args.root_folder.as_deref());
    idolbase_common::config::ensure_root_folder(&root)?;

    let db_path = idolbase_common::config::database_path(&root);
    info!("Database: {}", db_path.display());
    let pool = idolbase_common::db::init_database(&db_path).await?;

    let data_dir = match args.data_dir {
        Some(dir) => dir.into(),
        None => idolbase_common::config::seed_data_dir(&root),
    };
    info!("Seed documents: {}", data_dir.display());

    let pipeline = SeedPipeline::new(pool, RecordSource::new(data_dir));
    let outcome = pipeline.run().await?;

    info!(
        stages_run = outcome.stages_run,
        stages_skipped = outcome.stages_skipped,
        records_created = outcome.records_created,
        records_skipped = outcome.records_skipped,
        warnings = outcome.warnings,
        "Seed complete"
    );

    Ok(())
}
