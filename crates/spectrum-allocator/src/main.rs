//! Spectrum Allocation CLI
//!
//! Runs one allocation request against a telemetry table.
//!
//! Usage:
//!   allocate-spectrum --telemetry data/PanIndia_energy.csv \
//!                     --request request.json \
//!                     --output allocation.json

use anyhow::Result;
use clap::Parser;
use spectrum_allocator::{AllocationRequest, EngineConfig, SpectrumEngine};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "allocate-spectrum",
    about = "Allocate frequency bands to regions and score the result"
)]
struct Args {
    /// Telemetry table (CSV, or JSON with a .json extension)
    #[arg(short = 't', long, default_value = "data/PanIndia_energy.csv")]
    telemetry: PathBuf,

    /// Allocation request JSON file
    #[arg(short, long)]
    request: PathBuf,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Engine config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible allocation
    #[arg(long)]
    seed: Option<u64>,

    /// Override the generation count
    #[arg(long)]
    generations: Option<usize>,

    /// Override the population size
    #[arg(long)]
    population: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Regional Spectrum Allocator");
    info!("{}", "=".repeat(60));

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(generations) = args.generations {
        config.optimizer.generations = generations;
    }
    if let Some(population) = args.population {
        config.optimizer.population_size = population;
    }

    let engine = SpectrumEngine::from_path(&args.telemetry, config)?;

    info!("Reading request from {:?}", args.request);
    let request: AllocationRequest =
        serde_json::from_reader(BufReader::new(File::open(&args.request)?))?;

    let response = engine.allocate(&request)?;

    match &args.output {
        Some(path) => {
            info!("Writing output to {:?}", path);
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &response)?;
        }
        None => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    // Summary
    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Score: {:.3}  Jain: {:.3}", response.allocation.score, response.fairness.jain);
    for (region, label) in &response.allocation.allocation {
        let status = response
            .monitoring
            .get(region)
            .map(|m| format!("{:?}", m.status))
            .unwrap_or_default();
        info!("  {:20} | {:32} | {}", region, label, status);
    }

    Ok(())
}
