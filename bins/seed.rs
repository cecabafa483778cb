//! Batch loader for the key-value tables.
//!
//! ```bash
//! seed --table competencies --file competencies.json --data-dir data
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use models::{association::AssociationRecord, competency::{validate_competency_id, Competency}};
use service::runtime::{self, Tables};
use service::seed::{parse_items, seed_table, SeedReport};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Table {
    Competencies,
    TrackingLocations,
}

/// Load a JSON array of items into one table
#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Write every item of a JSON array into a table")]
struct Args {
    /// JSON file holding an array of items
    #[arg(long)]
    file: PathBuf,

    /// Target table
    #[arg(long, value_enum)]
    table: Table,

    /// Directory holding the table files
    #[arg(long, default_value = "data", env = "DATA_DIR")]
    data_dir: String,
}

async fn load(args: &Args) -> anyhow::Result<SeedReport> {
    let bytes = tokio::fs::read(&args.file).await?;
    let items = parse_items(&bytes)?;
    let storage = configs::StorageConfig { backend: configs::StorageBackend::File, data_dir: args.data_dir.clone() };
    let Tables { competencies, tracking_locations, .. } = runtime::open_tables(&storage).await?;

    let report = match args.table {
        Table::Competencies => {
            seed_table(&*competencies, items, |c: &Competency| {
                validate_competency_id(&c.competency_id)?;
                Ok(c.competency_id.clone())
            })
            .await
        }
        Table::TrackingLocations => {
            seed_table(&*tracking_locations, items, |r: &AssociationRecord| {
                r.validate()?;
                Ok(r.id.clone())
            })
            .await
        }
    };
    Ok(report)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_default();
    let args = Args::parse();

    match load(&args).await {
        Ok(report) => {
            info!(table = ?args.table, written = report.written, failed = report.failed.len(), "seed complete");
            for f in &report.failed {
                error!(index = f.index, reason = %f.reason, "unable to add item");
            }
            if report.is_clean() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        Err(e) => {
            error!(error = %e, file = %args.file.display(), "seed failed");
            ExitCode::FAILURE
        }
    }
}
