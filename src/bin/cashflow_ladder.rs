//! Write the per-scenario cash-flow ladder to CSV
//!
//! Usage: cashflow_ladder [--instruments <csv>] [--config <json>] [--today <date>] [--output <csv>]

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use irrbb_engine::instrument::loader::DEFAULT_INSTRUMENTS_PATH;
use irrbb_engine::{load_instruments, RunConfig, ScenarioRunner};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "cashflow_ladder", about = "Export the scenario cash-flow ladder")]
struct Cli {
    #[arg(long, default_value = DEFAULT_INSTRUMENTS_PATH)]
    instruments: PathBuf,

    /// Run config JSON; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    today: Option<NaiveDate>,

    #[arg(long, default_value = "cashflow_ladder.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let today = cli.today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };
    config.detailed_output = true;
    config.parallel = true;

    let runner = ScenarioRunner::with_config(config).context("Invalid run config")?;
    let snapshot = load_instruments(&cli.instruments)
        .with_context(|| format!("Failed to load instruments from {}", cli.instruments.display()))?;
    println!(
        "Loaded {} instruments ({} rows rejected), valuing as of {}",
        snapshot.instruments.len(),
        snapshot.rejected.len(),
        today
    );

    let start = Instant::now();
    let report = runner.run_snapshot(&snapshot, today)?;

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("Unable to create {}", cli.output.display()))?;
    for row in &report.cashflow_ladder {
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} ladder rows to {} in {:?}",
        report.cashflow_ladder.len(),
        cli.output.display(),
        start.elapsed()
    );
    Ok(())
}
