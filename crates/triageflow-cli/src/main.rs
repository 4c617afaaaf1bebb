//! `triageflow` - runs one allocation over a directory of CSV files and
//! prints the report as JSON.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use thiserror::Error;
use triageflow::{
    load_dataset, AllocationEngine, AllocationError, ConfigError, DatasetSummary, EngineConfig,
    InMemoryStore, IngestError,
};

#[derive(Debug, Parser)]
#[command(name = "triageflow", version, about = "Allocate beds, stock and supplies")]
struct Cli {
    /// Directory holding patients.csv, hospitals.csv, links.csv and friends.
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Engine configuration; `.yaml` and `.yml` files are read as YAML, anything else as TOML.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Solve and report without committing.
    #[arg(long)]
    dry_run: bool,

    /// Print single-line JSON.
    #[arg(long)]
    compact: bool,

    /// Refuse to run when any CSV row was skipped.
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assign waiting patients to hospital beds.
    Beds,
    /// Route center stock to zone demand.
    Transport,
    /// Derive capacity slots from a route network.
    Network {
        #[arg(long)]
        source: String,
        #[arg(long)]
        sink: String,
    },
    /// Pack available items into the stored capacity slots.
    Supplies,
    /// Pack available items into one kit.
    Kit {
        #[arg(long)]
        capacity: Option<i64>,
    },
    /// Transport, slot derivation and supply packing in one commit.
    SupplyChain,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0} CSV rows were skipped")]
    SkippedRows(usize),
}

fn load_config(path: Option<&Path>, dry_run: bool) -> Result<EngineConfig, CliError> {
    let config = match path {
        Some(path) if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        ) => EngineConfig::from_yaml_file(path)?,
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    Ok(if dry_run { config.with_dry_run(true) } else { config })
}

fn print_json<T: Serialize>(report: &T, compact: bool) -> Result<(), CliError> {
    let json = if compact {
        serde_json::to_string(report)?
    } else {
        serde_json::to_string_pretty(report)?
    };
    println!("{json}");
    Ok(())
}

fn report_skipped(summary: &DatasetSummary) {
    for file in &summary.diagnostics {
        for row in &file.skipped {
            eprintln!(
                "{} {}:{} {}",
                "skipped".yellow(),
                file.file,
                row.line,
                row.reason.bright_black()
            );
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref(), cli.dry_run)?;
    let (store, summary) = load_dataset(&cli.data)?;
    report_skipped(&summary);
    if cli.strict && summary.skipped() > 0 {
        return Err(CliError::SkippedRows(summary.skipped()));
    }

    let mut engine: AllocationEngine<InMemoryStore> = AllocationEngine::with_config(store, config);
    match cli.command {
        Command::Beds => print_json(&engine.allocate_beds()?, cli.compact),
        Command::Transport => print_json(&engine.allocate_transport()?, cli.compact),
        Command::Network { source, sink } => {
            print_json(&engine.plan_route_capacities(&source, &sink)?, cli.compact)
        }
        Command::Supplies => print_json(&engine.optimize_supplies()?, cli.compact),
        Command::Kit { capacity } => print_json(&engine.optimize_kit(capacity)?, cli.compact),
        Command::SupplyChain => print_json(&engine.run_supply_chain()?, cli.compact),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    triageflow::console::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
